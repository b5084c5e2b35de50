//! Catalog records and the inputs that create or modify them

use serde::{Deserialize, Serialize};

/// Minimum trimmed title length accepted by the create form
pub const MIN_TITLE_LEN: usize = 3;

/// Minimum trimmed description length accepted by the create form
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// Record identifier
///
/// Remote ids are opaque provider strings; local ids are derived from the
/// creation timestamp.
pub type RecordId = String;

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,

    /// Display title, never empty
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Thumbnail URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// User favorite flag. Only local commands change it.
    #[serde(default)]
    pub liked: bool,

    /// True iff the record was created locally
    #[serde(default)]
    pub created: bool,

    /// Carried for shape compatibility; removal is a hard delete
    #[serde(default)]
    pub deleted: bool,
}

impl Record {
    /// A remote-origin record with only an id and title
    pub fn new(id: impl Into<RecordId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            category: None,
            image: None,
            liked: false,
            created: false,
            deleted: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// First line of the description, trimmed
    pub fn short_description(&self) -> &str {
        self.description
            .lines()
            .next()
            .unwrap_or(&self.description)
            .trim()
    }

    /// Label describing where the record came from
    pub fn origin(&self) -> &'static str {
        if self.created {
            "local"
        } else {
            "remote"
        }
    }
}

/// Fields for creating a local record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDraft {
    /// Explicit id; generated from the clock when absent
    #[serde(default)]
    pub id: Option<RecordId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A create-form field that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Description,
}

/// Validation failure for a [`RecordDraft`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftError {
    pub field: DraftField,
    pub message: String,
}

impl std::fmt::Display for DraftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl RecordDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Check the create-form rules.
    ///
    /// The store never calls this; the presentation layer does before
    /// dispatching a create.
    pub fn validate(&self) -> Vec<DraftError> {
        [check_title(&self.title), check_description(&self.description)]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Trim every field and drop blank optional ones
    pub fn normalized(self) -> Self {
        Self {
            id: non_blank(self.id),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: non_blank(self.category),
            image: non_blank(self.image),
        }
    }
}

fn check_title(title: &str) -> Option<DraftError> {
    (title.trim().chars().count() < MIN_TITLE_LEN).then(|| DraftError {
        field: DraftField::Title,
        message: format!("Title must be at least {MIN_TITLE_LEN} characters"),
    })
}

fn check_description(description: &str) -> Option<DraftError> {
    (description.trim().chars().count() < MIN_DESCRIPTION_LEN).then(|| DraftError {
        field: DraftField::Description,
        message: format!("Description must be at least {MIN_DESCRIPTION_LEN} characters"),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Partial set of field overwrites for an existing record
///
/// `None` leaves a field untouched. For the optional fields, `Some(None)`
/// clears the value. `created` is not representable here: origin is fixed
/// at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Option<String>>,
    pub image: Option<Option<String>>,
    pub liked: Option<bool>,
    pub deleted: Option<bool>,
}

impl RecordChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = Some(category);
        self
    }

    pub fn image(mut self, image: Option<String>) -> Self {
        self.image = Some(image);
        self
    }

    pub fn liked(mut self, liked: bool) -> Self {
        self.liked = Some(liked);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the create-form rules to the text fields being overwritten.
    ///
    /// Absent fields are not checked.
    pub fn validate(&self) -> Vec<DraftError> {
        [
            self.title.as_deref().and_then(check_title),
            self.description.as_deref().and_then(check_description),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Trim the text fields being overwritten
    pub fn normalized(mut self) -> Self {
        self.title = self.title.map(|t| t.trim().to_string());
        self.description = self.description.map(|d| d.trim().to_string());
        self
    }

    /// Overwrite the fields present in `self` onto `record`
    pub fn apply_to(&self, record: &mut Record) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
        if let Some(category) = &self.category {
            record.category = category.clone();
        }
        if let Some(image) = &self.image {
            record.image = image.clone();
        }
        if let Some(liked) = self.liked {
            record.liked = liked;
        }
        if let Some(deleted) = self.deleted {
            record.deleted = deleted;
        }
    }
}

/// A full record used as an update sets every mutable field
impl From<Record> for RecordChanges {
    fn from(record: Record) -> Self {
        Self {
            title: Some(record.title),
            description: Some(record.description),
            category: Some(record.category),
            image: Some(record.image),
            liked: Some(record.liked),
            deleted: Some(record.deleted),
        }
    }
}
