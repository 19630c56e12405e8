use std::rc::Rc;

use crate::runtime::Dice;

/// Produces the bot's answer to one user message.
pub trait Responder {
    fn reply(&self, message: &str) -> String;
}

/// Subject detected in a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Pricing,
    Acquisition,
    Operations,
    Training,
    Contact,
    Greeting,
}

#[derive(Debug, Clone)]
struct KeywordGroup {
    topic: Topic,
    keywords: &'static [&'static str],
    response: &'static str,
}

// Priority order: the first group with a matching keyword answers.
const GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        topic: Topic::Pricing,
        keywords: &["料金", "価格", "費用"],
        response: "料金についてお問い合わせいただき、ありがとうございます。\n\n集客用プランは月額4,980円〜、バックオフィス用プランは月額29,800円〜となっております。詳しい料金表は各サービスページでご確認いただけます。\n\nお客様のご状況に応じた最適なプランをご提案させていただきますので、お問い合わせフォームからご連絡ください。",
    },
    KeywordGroup {
        topic: Topic::Acquisition,
        keywords: &["集客", "マーケティング"],
        response: "集客用LINE公式アカウントについてお聞かせいただき、ありがとうございます。\n\n私たちの集客用サービスでは、リッチメニューの完全オーダーメイド制作、配信代行、分析レポートなどを通じて、お客様との関係性を深めるお手伝いをいたします。\n\n詳細は「集客用サービス」ページをご覧ください。",
    },
    KeywordGroup {
        topic: Topic::Operations,
        keywords: &["業務", "効率", "マニュアル", "バックオフィス"],
        response: "バックオフィス用LINE公式アカウントについてお問い合わせいただき、ありがとうございます。\n\n社内の業務マニュアルのデジタル化、FAQチャットボット構築、多言語対応など、業務効率化を実現します。\n\n詳しくは「バックオフィス用サービス」ページをご確認ください。",
    },
    KeywordGroup {
        topic: Topic::Training,
        keywords: &["研修", "内製", "自社"],
        response: "研修サービスについてお問い合わせいただき、ありがとうございます。\n\nLINE運用を内製化したい企業様向けに、12時間の実践的な研修プログラムをご用意しております。リスキリング補助金の対象で、実質負担額は100,000円となります。\n\n詳細は「研修サービス」ページでご確認ください。",
    },
    KeywordGroup {
        topic: Topic::Contact,
        keywords: &["問い合わせ", "相談", "連絡"],
        response: "お問い合わせをご希望でしたら、「お問い合わせ」ページのフォームからご連絡ください。\n\nお客様のご状況をお聞かせいただければ、最適なプランをご提案させていただきます。\n\n初回のご相談は無料ですので、お気軽にお声がけください。",
    },
    KeywordGroup {
        topic: Topic::Greeting,
        keywords: &["こんにちは", "はじめまして"],
        response: "こんにちは！ご訪問いただきありがとうございます。\n\n私たちは公式LINEアカウントを活用した集客支援と業務効率化を専門としております。\n\nご質問やご相談がございましたら、お気軽にお聞かせください。どのようなことでお困りでしょうか？",
    },
];

pub const FALLBACK_RESPONSES: [&str; 3] = [
    "ご質問いただき、ありがとうございます。\n\nより詳しくご案内するために、お問い合わせフォームからご連絡いただけますでしょうか？担当者より折り返しご連絡させていただきます。",
    "お問い合わせいただき、ありがとうございます。\n\nお客様のご状況に応じて最適なプランをご提案いたします。まずは無料相談をご利用ください。",
    "ご不明な点がございましたら、お問い合わせページからお気軽にご連絡ください。\n\n専門スタッフが丁寧にサポートいたします。",
];

/// Canned-response bot: keyword groups in priority order, then a uniformly
/// chosen fallback.
pub struct KeywordResponder {
    dice: Rc<dyn Dice>,
}

impl KeywordResponder {
    pub fn new(dice: Rc<dyn Dice>) -> Self {
        Self { dice }
    }

    /// Topic of the first keyword group the message mentions.
    pub fn classify(message: &str) -> Option<Topic> {
        Self::matching_group(message).map(|group| group.topic)
    }

    pub fn response_for(topic: Topic) -> &'static str {
        GROUPS
            .iter()
            .find(|group| group.topic == topic)
            .map_or(FALLBACK_RESPONSES[0], |group| group.response)
    }

    fn matching_group(message: &str) -> Option<&'static KeywordGroup> {
        let lowered = message.to_lowercase();
        GROUPS.iter().find(|group| {
            group
                .keywords
                .iter()
                .any(|keyword| lowered.contains(keyword))
        })
    }
}

impl Responder for KeywordResponder {
    fn reply(&self, message: &str) -> String {
        match Self::matching_group(message) {
            Some(group) => {
                tracing::debug!(topic = ?group.topic, "chat keyword matched");
                group.response.to_string()
            }
            None => FALLBACK_RESPONSES[self.dice.index(FALLBACK_RESPONSES.len())].to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::OsDice;
    use crate::runtime::testing::ScriptedDice;

    fn responder() -> KeywordResponder {
        KeywordResponder::new(Rc::new(ScriptedDice::new([0.0])))
    }

    #[test]
    fn pricing_keyword_anywhere_wins() {
        for message in ["料金", "LINEの料金を教えて", "費用感は？", "価格"] {
            assert_eq!(
                responder().reply(message),
                KeywordResponder::response_for(Topic::Pricing)
            );
        }
    }

    #[test]
    fn earlier_group_takes_priority() {
        // Mentions both operations and pricing.
        assert_eq!(
            KeywordResponder::classify("業務効率化の費用について"),
            Some(Topic::Pricing)
        );
        assert_eq!(
            KeywordResponder::classify("自社で相談したい"),
            Some(Topic::Training)
        );
        assert_eq!(
            KeywordResponder::classify("はじめまして、マーケティング担当です"),
            Some(Topic::Acquisition)
        );
        assert_eq!(KeywordResponder::classify("こんにちは"), Some(Topic::Greeting));
    }

    #[test]
    fn unmatched_message_uses_scripted_fallback() {
        let responder = KeywordResponder::new(Rc::new(ScriptedDice::new([0.0, 0.5, 0.9])));
        assert_eq!(responder.reply("hello"), FALLBACK_RESPONSES[0]);
        assert_eq!(responder.reply("hello"), FALLBACK_RESPONSES[1]);
        assert_eq!(responder.reply("hello"), FALLBACK_RESPONSES[2]);
        assert_eq!(KeywordResponder::classify("hello"), None);
    }

    #[test]
    fn fallbacks_are_roughly_uniform() {
        let responder = KeywordResponder::new(Rc::new(OsDice));
        let mut counts = [0_usize; 3];
        let trials = 6_000;
        for _ in 0..trials {
            let reply = responder.reply("特にありません");
            let index = FALLBACK_RESPONSES
                .iter()
                .position(|fallback| *fallback == reply)
                .unwrap();
            counts[index] += 1;
        }

        // Expect ~2000 each; the band is many standard deviations wide.
        for count in counts {
            assert!((1_700..=2_300).contains(&count), "counts = {counts:?}");
        }
    }
}
