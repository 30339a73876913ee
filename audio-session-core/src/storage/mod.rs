pub mod inline_payload;
