use crate::types::Polarity;

/// Produces polarity and subjectivity for a piece of text.
///
/// Implementations are immutable after construction and shared across
/// threads during batch scoring.
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Polarity;
}

/// Splits text into lowercase candidate keywords with stopwords removed.
pub trait Tokenizer: Send + Sync {
    fn name(&self) -> &str;
    fn tokenize(&self, text: &str) -> Vec<String>;
}

impl<T: Classifier + ?Sized> Classifier for Box<T> {
    fn classify(&self, text: &str) -> Polarity { (**self).classify(text) }
}

impl<T: Tokenizer + ?Sized> Tokenizer for Box<T> {
    fn name(&self) -> &str { (**self).name() }
    fn tokenize(&self, text: &str) -> Vec<String> { (**self).tokenize(text) }
}
