pub mod interface;
pub mod aws_translate;

pub use interface::{TranslateRequest, Translator};
pub use aws_translate::AwsTranslator;
