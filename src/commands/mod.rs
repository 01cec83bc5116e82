pub mod convert;
pub mod extract;
pub mod inspect;
pub mod ocr;
mod output;
#[cfg(test)]
mod tests;
