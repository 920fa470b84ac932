use tantivy::tokenizer::{LowerCaser, RemoveLongFilter, SimpleTokenizer, StopWordFilter, TextAnalyzer};

/// Tokens longer than this are dropped before stopword filtering.
pub const MAX_TOKEN_BYTES: usize = 40;

/// Full English stopword list used by the analyzer tokenizer.
pub const ENGLISH_STOPWORDS: &[&str] = &[
	"i","me","my","myself","we","our","ours","ourselves","you","your","yours","yourself","yourselves",
	"he","him","his","himself","she","her","hers","herself","it","its","itself","they","them","their",
	"theirs","themselves","what","which","who","whom","this","that","these","those","am","is","are",
	"was","were","be","been","being","have","has","had","having","do","does","did","doing","a","an",
	"the","and","but","if","or","because","as","until","while","of","at","by","for","with","about",
	"against","between","into","through","during","before","after","above","below","to","from","up",
	"down","in","out","on","off","over","under","again","further","then","once","here","there","when",
	"where","why","how","all","any","both","each","few","more","most","other","some","such","no","nor",
	"not","only","own","same","so","than","too","very","s","t","can","will","just","don","should","now",
	"d","ll","m","o","re","ve","y","ain","aren","couldn","didn","doesn","hadn","hasn","haven","isn",
	"ma","mightn","mustn","needn","shan","shouldn","wasn","weren","won","wouldn","could","would","may",
	"might","must","shall",
];

/// Minimal list bound when the full resources are unavailable.
pub const FALLBACK_STOPWORDS: &[&str] = &[
	"the","a","an","and","or","but","in","on","at","to","for","of","with","by","is","are","was","were",
	"be","been","being","have","has","had","do","does","did","will","would","could","should","may",
	"might","must","can","this","that","these","those","i","you","he","she","it","we","they","me",
	"him","her","us","them",
];

pub fn build_analyzer<I>(stop_words: I) -> TextAnalyzer
where
	I: IntoIterator<Item = String>,
{
	TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(RemoveLongFilter::limit(MAX_TOKEN_BYTES))
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(stop_words))
		.build()
}

pub fn english_stopwords() -> Vec<String> {
	ENGLISH_STOPWORDS.iter().map(|s| s.to_string()).collect()
}
