//! Utility functions for request validation.

mod validation;

pub use validation::{
    parse_date, parse_optional_quantity, parse_quantity, require_quantity, require_text,
    validate_chat_message, validate_user_id, validate_utf8_no_null, NumericInput,
    MAX_CHAT_CHARS, MAX_QUANTITY, MIN_CHAT_CHARS,
};
