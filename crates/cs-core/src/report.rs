//! Summary statistics over a scored table

use crate::types::{ScoredRecord, SentimentLabel};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// English stop words excluded from token counts
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
        "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
        "amongst", "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone",
        "anything", "anyway", "anywhere", "are", "around", "as", "at", "back", "be", "became",
        "because", "become", "becomes", "becoming", "been", "before", "beforehand", "behind",
        "being", "below", "beside", "besides", "between", "beyond", "bill", "both", "bottom",
        "but", "by", "call", "can", "cannot", "cant", "co", "con", "could", "couldnt", "cry",
        "de", "describe", "detail", "do", "done", "down", "due", "during", "each", "eg",
        "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "etc", "even",
        "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen",
        "fifty", "fill", "find", "fire", "first", "five", "for", "former", "formerly", "forty",
        "found", "four", "from", "front", "full", "further", "get", "give", "go", "had", "has",
        "hasnt", "have", "he", "hence", "her", "here", "hereafter", "hereby", "herein",
        "hereupon", "hers", "herself", "him", "himself", "his", "how", "however", "hundred",
        "i", "ie", "if", "in", "inc", "indeed", "interest", "into", "is", "it", "its",
        "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd", "made", "many",
        "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover", "most",
        "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither", "never",
        "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
        "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
        "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
        "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem",
        "seemed", "seeming", "seems", "serious", "several", "she", "should", "show", "side",
        "since", "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something",
        "sometime", "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than",
        "that", "the", "their", "them", "themselves", "then", "thence", "there", "thereafter",
        "thereby", "therefore", "therein", "thereupon", "these", "they", "thick", "thin",
        "third", "this", "those", "though", "three", "through", "throughout", "thru", "thus",
        "to", "together", "too", "top", "toward", "towards", "twelve", "twenty", "two", "un",
        "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were",
        "what", "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas",
        "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while", "whither",
        "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without",
        "would", "yet", "you", "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Count of one label within a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelShare {
    pub label: String,
    pub count: usize,
    /// Share of the table in percent
    pub percent: f64,
}

/// Agreement between the two classifiers over records labeled by both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreement {
    pub compared: usize,
    pub agreed: usize,
}

impl Agreement {
    pub fn rate(&self) -> f64 {
        if self.compared == 0 {
            0.0
        } else {
            self.agreed as f64 / self.compared as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCount {
    pub token: String,
    pub count: usize,
}

/// Aggregate view of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total: usize,
    /// All three labels, zero counts included
    pub neural: Vec<LabelShare>,
    /// Empty when no record carries a statistical label
    pub statistical: Vec<LabelShare>,
    pub agreement: Option<Agreement>,
    pub top_tokens: Vec<TokenCount>,
}

impl AnalysisSummary {
    pub fn from_records(records: &[ScoredRecord], top_n: usize) -> Self {
        let total = records.len();

        let neural = SentimentLabel::ALL
            .iter()
            .map(|label| {
                let count = records.iter().filter(|r| r.neural_label == *label).count();
                share(label.as_str(), count, total)
            })
            .collect();

        let mut statistical_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for label in records.iter().filter_map(|r| r.statistical_label.as_deref()) {
            *statistical_counts.entry(label).or_default() += 1;
        }
        let statistical = statistical_counts
            .into_iter()
            .map(|(label, count)| share(label, count, total))
            .collect();

        let mut agreement = Agreement {
            compared: 0,
            agreed: 0,
        };
        for agrees in records.iter().filter_map(ScoredRecord::agrees) {
            agreement.compared += 1;
            if agrees {
                agreement.agreed += 1;
            }
        }

        let texts: Vec<&str> = records
            .iter()
            .map(|r| r.comment.clean_text.as_str())
            .collect();

        Self {
            total,
            neural,
            statistical,
            agreement: (agreement.compared > 0).then_some(agreement),
            top_tokens: top_tokens(&texts, top_n),
        }
    }
}

fn share(label: &str, count: usize, total: usize) -> LabelShare {
    let percent = if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    };
    LabelShare {
        label: label.to_string(),
        count,
        percent,
    }
}

/// Most frequent whitespace tokens of cleaned text.
///
/// Surrounding punctuation is trimmed; stop words and tokens of two
/// characters or fewer are skipped. Ties are ordered alphabetically.
pub fn top_tokens<S: AsRef<str>>(texts: &[S], n: usize) -> Vec<TokenCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for text in texts {
        for word in text.as_ref().split_whitespace() {
            let word = word.trim_matches(|c: char| c.is_ascii_punctuation());
            if word.chars().count() <= 2 || STOP_WORDS.contains(word) {
                continue;
            }
            *counts.entry(word).or_default() += 1;
        }
    }

    let mut ranked: Vec<TokenCount> = counts
        .into_iter()
        .map(|(token, count)| TokenCount {
            token: token.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.token.cmp(&b.token)));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CleanedComment, CommentRecord};
    use pretty_assertions::assert_eq;

    fn scored(text: &str, neural: SentimentLabel, statistical: Option<&str>) -> ScoredRecord {
        let ts = "2024-05-01T12:00:00Z".parse().unwrap();
        let record = CommentRecord {
            author: "viewer".to_string(),
            raw_text: text.to_string(),
            like_count: 0,
            published_at: ts,
            updated_at: ts,
        };
        ScoredRecord {
            comment: CleanedComment::from_record(record),
            statistical_label: statistical.map(str::to_string),
            neural_label: neural,
            neural_confidence: 0.9,
            neural_raw_label: "POSITIVE".to_string(),
        }
    }

    #[test]
    fn test_distributions_and_agreement() {
        let records = vec![
            scored("great song", SentimentLabel::Positive, Some("positive")),
            scored("awful mix", SentimentLabel::Negative, Some("positive")),
            scored("great great video", SentimentLabel::Positive, Some("neutral")),
            scored("fine", SentimentLabel::Neutral, Some("neutral")),
        ];
        let summary = AnalysisSummary::from_records(&records, 10);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.neural[0].label, "positive");
        assert_eq!(summary.neural[0].count, 2);
        assert_eq!(summary.neural[0].percent, 50.0);
        assert_eq!(summary.statistical.len(), 2);
        assert_eq!(summary.statistical[0].label, "neutral");

        let agreement = summary.agreement.unwrap();
        assert_eq!(agreement.compared, 4);
        assert_eq!(agreement.agreed, 2);
        assert_eq!(agreement.rate(), 0.5);
        assert_eq!(summary.top_tokens[0].token, "great");
        assert_eq!(summary.top_tokens[0].count, 3);
    }

    #[test]
    fn test_without_statistical_labels() {
        let records = vec![scored("nice", SentimentLabel::Positive, None)];
        let summary = AnalysisSummary::from_records(&records, 5);
        assert!(summary.statistical.is_empty());
        assert!(summary.agreement.is_none());
    }

    #[test]
    fn test_empty_table() {
        let summary = AnalysisSummary::from_records(&[], 5);
        assert_eq!(summary.total, 0);
        assert!(summary.neural.iter().all(|s| s.count == 0 && s.percent == 0.0));
        assert!(summary.top_tokens.is_empty());
    }

    #[test]
    fn test_top_tokens_filters_noise() {
        let texts = ["this is so amazing!!!", "amazing, truly amazing", "ok wow wow"];
        let tokens = top_tokens(&texts, 3);
        assert_eq!(
            tokens,
            vec![
                TokenCount {
                    token: "amazing".to_string(),
                    count: 3
                },
                TokenCount {
                    token: "wow".to_string(),
                    count: 2
                },
                TokenCount {
                    token: "truly".to_string(),
                    count: 1
                },
            ]
        );
    }
}
