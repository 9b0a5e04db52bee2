use nb_core::{Digest, DigestGroup};
use serde_json::{json, Value};

fn text_div(content: String) -> Value {
    json!({
        "tag": "div",
        "text": { "tag": "lark_md", "content": content }
    })
}

fn button(label: String, url: &str, kind: &str) -> Value {
    json!({
        "tag": "action",
        "actions": [{
            "tag": "button",
            "text": { "tag": "plain_text", "content": label },
            "url": url,
            "type": kind
        }]
    })
}

fn group_elements(group: &DigestGroup) -> Vec<Value> {
    let tag = group.tag;
    let mut elements = vec![text_div(format!(
        "{} **{}** ({})",
        tag.emoji(),
        tag.display_name(),
        group.count()
    ))];

    for (i, item) in group.items.iter().enumerate() {
        elements.push(text_div(format!(
            "**{}. {}**\n{}\n{}",
            i + 1,
            item.zh_title,
            item.title,
            item.summary
        )));
        elements.push(button("📖 阅读原文".to_string(), &item.link, "default"));
    }

    elements.push(button(
        format!("🔗 查看更多{}资讯", tag.display_name()),
        tag.homepage(),
        "primary",
    ));
    elements
}

fn card(template: &str, title: String, elements: Vec<Value>) -> Value {
    json!({
        "msg_type": "interactive",
        "card": {
            "config": { "wide_screen_mode": true, "enable_forward": true },
            "header": {
                "template": template,
                "title": { "tag": "plain_text", "content": title }
            },
            "elements": elements
        }
    })
}

/// Renders a digest as a Feishu `interactive` message body (without signature fields).
pub fn render_card(digest: &Digest) -> Value {
    if digest.is_empty() {
        return card(
            "blue",
            format!("📱 {} AI新闻播报", digest.date),
            vec![text_div("😴 今日暂无AI新闻更新\n\n请稍后再来查看最新资讯".to_string())],
        );
    }

    let mut elements = Vec::new();
    for (i, group) in digest.groups.iter().enumerate() {
        if i > 0 {
            elements.push(json!({ "tag": "hr" }));
        }
        elements.extend(group_elements(group));
    }

    elements.push(json!({ "tag": "hr" }));
    elements.push(text_div(format!(
        "🤖 *由AI新闻机器人自动播报* | ⏰ {} 更新",
        digest.generated_at.format("%H:%M")
    )));

    card("turquoise", format!("🔥 {} 每日AI新闻速览", digest.date), elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use nb_core::{NewsItem, SourceTag};

    fn item(tag: SourceTag, link: &str) -> NewsItem {
        NewsItem {
            date: "2024-05-01".to_string(),
            tag,
            title: "OpenAI ships".to_string(),
            zh_title: "OpenAI 发布".to_string(),
            link: link.to_string(),
            content: "body".to_string(),
            summary: "一句话摘要".to_string(),
        }
    }

    fn digest(items: &[NewsItem]) -> Digest {
        let at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        Digest::compose(items, at)
    }

    #[test]
    fn test_empty_card() {
        let value = render_card(&digest(&[]));
        assert_eq!(value["msg_type"], "interactive");
        assert_eq!(value["card"]["header"]["template"], "blue");
        assert_eq!(value["card"]["header"]["title"]["content"], "📱 2024-05-01 AI新闻播报");
        let elements = value["card"]["elements"].as_array().unwrap();
        assert_eq!(elements.len(), 1);
        assert!(elements[0]["text"]["content"]
            .as_str()
            .unwrap()
            .contains("今日暂无AI新闻更新"));
    }

    #[test]
    fn test_grouped_card() {
        let items = vec![
            item(SourceTag::TechCrunch, "https://techcrunch.com/a"),
            item(SourceTag::GitHub, "https://github.com/o/r"),
            item(SourceTag::TechCrunch, "https://techcrunch.com/b"),
        ];
        let value = render_card(&digest(&items));
        assert_eq!(value["card"]["header"]["template"], "turquoise");
        assert_eq!(value["card"]["header"]["title"]["content"], "🔥 2024-05-01 每日AI新闻速览");

        let elements = value["card"]["elements"].as_array().unwrap();
        assert_eq!(elements[0]["text"]["content"], "🗞️ **TechCrunch** (2)");
        assert_eq!(
            elements[1]["text"]["content"],
            "**1. OpenAI 发布**\nOpenAI ships\n一句话摘要"
        );
        assert_eq!(elements[2]["actions"][0]["url"], "https://techcrunch.com/a");
        assert_eq!(elements[4]["actions"][0]["url"], "https://techcrunch.com/b");
        assert_eq!(elements[5]["actions"][0]["url"], "https://techcrunch.com");
        assert_eq!(elements[6]["tag"], "hr");
        assert_eq!(elements[7]["text"]["content"], "🐙 **GitHub Trending** (1)");

        let footer = elements.last().unwrap()["text"]["content"].as_str().unwrap();
        assert!(footer.contains("⏰ 09:05 更新"));
    }
}
