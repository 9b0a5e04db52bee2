use chrono::NaiveDateTime;
use serde::Serialize;

use crate::types::{NewsItem, SourceTag};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigestGroup {
    pub tag: SourceTag,
    pub items: Vec<NewsItem>,
}

impl DigestGroup {
    pub fn count(&self) -> usize {
        self.items.len()
    }
}

/// Format-neutral view of one run's persisted items, grouped by source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Digest {
    pub date: String,
    pub generated_at: NaiveDateTime,
    pub groups: Vec<DigestGroup>,
}

impl Digest {
    /// Groups keep the order in which their first item appears.
    pub fn compose(items: &[NewsItem], generated_at: NaiveDateTime) -> Self {
        let mut groups: Vec<DigestGroup> = Vec::new();
        for item in items {
            match groups.iter_mut().find(|g| g.tag == item.tag) {
                Some(group) => group.items.push(item.clone()),
                None => groups.push(DigestGroup {
                    tag: item.tag,
                    items: vec![item.clone()],
                }),
            }
        }

        Self {
            date: generated_at.format("%Y-%m-%d").to_string(),
            generated_at,
            groups,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(DigestGroup::count).sum()
    }

    pub fn count_for(&self, tag: SourceTag) -> usize {
        self.groups
            .iter()
            .find(|g| g.tag == tag)
            .map(DigestGroup::count)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn item(tag: SourceTag, link: &str) -> NewsItem {
        NewsItem {
            date: "2024-05-01".to_string(),
            tag,
            title: format!("title {}", link),
            zh_title: format!("标题 {}", link),
            link: link.to_string(),
            content: "content".to_string(),
            summary: "摘要".to_string(),
        }
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_compose_groups_in_first_seen_order() {
        let items = vec![
            item(SourceTag::GitHub, "g1"),
            item(SourceTag::TechCrunch, "t1"),
            item(SourceTag::GitHub, "g2"),
        ];
        let digest = Digest::compose(&items, at());

        assert_eq!(digest.date, "2024-05-01");
        assert_eq!(digest.groups.len(), 2);
        assert_eq!(digest.groups[0].tag, SourceTag::GitHub);
        assert_eq!(digest.groups[0].count(), 2);
        assert_eq!(digest.groups[1].tag, SourceTag::TechCrunch);
        assert_eq!(digest.total(), 3);
        assert_eq!(digest.count_for(SourceTag::Verge), 0);
    }

    #[test]
    fn test_compose_empty() {
        let digest = Digest::compose(&[], at());
        assert!(digest.is_empty());
        assert_eq!(digest.total(), 0);
    }
}
