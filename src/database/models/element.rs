use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Text,
    Email,
    Number,
    Date,
    Phone,
    Rating,
    Image,
    Button,
    #[serde(rename = "Text_Bubble")]
    TextBubble,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Text => "Text",
            ElementType::Email => "Email",
            ElementType::Number => "Number",
            ElementType::Date => "Date",
            ElementType::Phone => "Phone",
            ElementType::Rating => "Rating",
            ElementType::Image => "Image",
            ElementType::Button => "Button",
            ElementType::TextBubble => "Text_Bubble",
        }
    }

    /// Image, Button and Text_Bubble are display-only: they never take answers,
    /// never gate submission and never appear in aggregated responses.
    pub fn collects_input(&self) -> bool {
        !matches!(
            self,
            ElementType::Image | ElementType::Button | ElementType::TextBubble
        )
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Text" => ElementType::Text,
            "Email" => ElementType::Email,
            "Number" => ElementType::Number,
            "Date" => ElementType::Date,
            "Phone" => ElementType::Phone,
            "Rating" => ElementType::Rating,
            "Image" => ElementType::Image,
            "Button" => ElementType::Button,
            "Text_Bubble" => ElementType::TextBubble,
            other => return Err(format!("invalid element type '{}'", other)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: Uuid,
    /// Stable id assigned by the form editor; elements are reconciled on this
    pub client_id: String,
    pub form_id: Uuid,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub options: Vec<String>,
    pub value: Option<String>,
    pub required: bool,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Element {
    pub fn collects_input(&self) -> bool {
        self.element_type.collects_input()
    }
}

/// Element definition as sent by the form editor
#[derive(Debug, Clone, Deserialize)]
pub struct ElementDraft {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub options: Option<Vec<String>>,
    pub value: Option<String>,
    pub required: Option<bool>,
    pub link: Option<String>,
}

impl ElementDraft {
    fn link(&self) -> Option<String> {
        match self.element_type {
            ElementType::Image => self.link.clone(),
            _ => None,
        }
    }

    pub fn into_element(self, form_id: Uuid) -> Element {
        let now = Utc::now();
        let link = self.link();
        Element {
            id: Uuid::new_v4(),
            client_id: self.id,
            form_id,
            element_type: self.element_type,
            label: self.label,
            placeholder: self.placeholder,
            options: self.options.unwrap_or_default(),
            value: self.value,
            required: self.required.unwrap_or(false),
            link,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy changed fields onto an existing element. Returns whether anything changed.
    /// Omitted options and required flags leave the stored values alone.
    pub fn apply_to(&self, element: &mut Element) -> bool {
        let mut changed = false;

        if element.element_type != self.element_type {
            element.element_type = self.element_type;
            changed = true;
        }
        if element.label != self.label {
            element.label = self.label.clone();
            changed = true;
        }
        if element.placeholder != self.placeholder {
            element.placeholder = self.placeholder.clone();
            changed = true;
        }
        if let Some(options) = &self.options {
            if &element.options != options {
                element.options = options.clone();
                changed = true;
            }
        }
        if let Some(required) = self.required {
            if element.required != required {
                element.required = required;
                changed = true;
            }
        }
        if element.value != self.value {
            element.value = self.value.clone();
            changed = true;
        }
        let link = self.link();
        if element.link != link {
            element.link = link;
            changed = true;
        }

        if changed {
            element.updated_at = Utc::now();
        }
        changed
    }
}
