//! Reply generation strategies.

mod generative;
mod template;

pub use generative::{
    GenerativeConfig, GenerativeReplyGenerator, DEFAULT_RECIPIENT_LABEL, SHORT_HASH_LEN,
};
pub use template::{to_base36, TemplatePick, TemplateReplyGenerator};
