//! Capability keyword dictionary used by the alignment scorer.

/// A named group of capability keywords. Keywords are lowercase and may be
/// multi-word phrases; matching is substring-based on normalized text.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityBucket {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

/// Buckets in report order. The overall score averages over all of them.
pub const SKILL_BUCKETS: &[CapabilityBucket] = &[
    CapabilityBucket {
        name: "skills",
        keywords: &[
            "analytics",
            "data analysis",
            "insights",
            "business insights",
            "strategy",
            "strategic",
            "stakeholder",
            "stakeholder management",
            "problem solving",
            "decision making",
            "scenario analysis",
        ],
    },
    CapabilityBucket {
        name: "ownership",
        keywords: &[
            "led",
            "leadership",
            "owned",
            "ownership",
            "managed",
            "management",
            "delivered",
            "delivery",
            "end to end",
            "e2e",
            "accountable",
            "responsible for",
            "driving",
            "executed",
            "scaled",
        ],
    },
    CapabilityBucket {
        name: "tools",
        keywords: &[
            "python",
            "sql",
            "power bi",
            "tableau",
            "excel",
            "pandas",
            "numpy",
            "spark",
            "dashboard",
            "data visualization",
            "etl",
            "bigquery",
            "snowflake",
            "vba",
            "dax",
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bucket_order() {
        let names: Vec<_> = SKILL_BUCKETS.iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["skills", "ownership", "tools"]);
    }

    #[test]
    fn test_keywords_are_normalized_form() {
        for bucket in SKILL_BUCKETS {
            for kw in bucket.keywords {
                assert!(
                    kw.chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' '),
                    "keyword '{kw}' would never match normalized text"
                );
            }
        }
    }

    #[test]
    fn test_no_duplicate_keywords_within_bucket() {
        for bucket in SKILL_BUCKETS {
            let unique: HashSet<_> = bucket.keywords.iter().collect();
            assert_eq!(unique.len(), bucket.keywords.len(), "bucket {}", bucket.name);
        }
    }
}
