use std::sync::Arc;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu, ensure};

use crate::easing::Easing;

/// Element id of the inline JSON block that overrides defaults.
pub const CONFIG_ELEMENT_ID: &str = "linebiz-config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealSettings {
    /// Fraction of the target's area that must be visible.
    pub threshold: f64,
    pub root_margin: String,
    pub revealed_class: String,
    pub selectors: Vec<String>,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".to_string(),
            revealed_class: "visible".to_string(),
            selectors: vec![
                ".fade-in".to_string(),
                ".slide-in-left".to_string(),
                ".slide-in-right".to_string(),
                ".scale-in".to_string(),
                ".section".to_string(),
                ".feature-card".to_string(),
                ".pricing-card".to_string(),
                ".problem-category".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterSettings {
    pub selector: String,
    pub duration_ms: u32,
    pub easing: Easing,
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self {
            selector: ".stat-number".to_string(),
            duration_ms: 2000,
            easing: Easing::EaseOutCubic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavSettings {
    pub header_id: String,
    pub header_condensed_class: String,
    /// Extra gap kept between the fixed header and the scrolled-to section.
    pub fixed_padding: f64,
    pub scroll_duration_ms: u32,
    pub scroll_easing: Easing,
    pub point_item_class: String,
    pub press_restore_ms: u32,
    pub scroll_top_id: String,
    pub scroll_top_threshold: f64,
    pub header_condense_threshold: f64,
    pub scroll_throttle_ms: u32,
    pub resize_debounce_ms: u32,
}

impl Default for NavSettings {
    fn default() -> Self {
        Self {
            header_id: "header".to_string(),
            header_condensed_class: "scrolled".to_string(),
            fixed_padding: 20.0,
            scroll_duration_ms: 800,
            scroll_easing: Easing::EaseInOutQuad,
            point_item_class: "point-item".to_string(),
            press_restore_ms: 150,
            scroll_top_id: "scrollTop".to_string(),
            scroll_top_threshold: 300.0,
            header_condense_threshold: 100.0,
            scroll_throttle_ms: 16,
            resize_debounce_ms: 250,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSettings {
    pub toggle_id: String,
    pub panel_id: String,
    pub active_class: String,
    pub link_selector: String,
    /// Viewports wider than this close the menu on resize.
    pub mobile_breakpoint: f64,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            toggle_id: "nav-toggle".to_string(),
            panel_id: "nav-menu".to_string(),
            active_class: "active".to_string(),
            link_selector: "a".to_string(),
            mobile_breakpoint: 768.0,
        }
    }
}

/// Localized copy for field-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationMessages {
    pub required: String,
    pub invalid_email: String,
    pub invalid_phone: String,
}

impl Default for ValidationMessages {
    fn default() -> Self {
        Self {
            required: "この項目は必須です".to_string(),
            invalid_email: "メールアドレスの形式が正しくありません".to_string(),
            invalid_phone: "電話番号の形式が正しくありません".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    pub form_id: String,
    pub submit_selector: String,
    pub loading_label: String,
    /// Requires at least ten characters in telephone fields.
    pub strict_phone: bool,
    pub phone_assist: bool,
    pub send_delay_ms: u32,
    /// Probability in `[0, 1]` that the simulated send succeeds.
    pub success_rate: f64,
    pub persist_submissions: bool,
    pub banner_dismiss_ms: u32,
    pub banner_fade_ms: u32,
    pub success_text: String,
    pub failure_text: String,
    pub messages: ValidationMessages,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            form_id: "contactForm".to_string(),
            submit_selector: "button[type=\"submit\"]".to_string(),
            loading_label: "<span class=\"loading\"></span> 送信中...".to_string(),
            strict_phone: false,
            phone_assist: true,
            send_delay_ms: 2000,
            success_rate: 1.0,
            persist_submissions: true,
            banner_dismiss_ms: 5000,
            banner_fade_ms: 300,
            success_text: "お問い合わせを受け付けました。担当者より2営業日以内にご連絡いたします。"
                .to_string(),
            failure_text: "送信に失敗しました。お手数ですが、再度お試しください。".to_string(),
            messages: ValidationMessages::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub enabled: bool,
    pub reply_delay_ms: u32,
    pub title: String,
    pub placeholder: String,
    pub greeting: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            reply_delay_ms: 1000,
            title: "LINE導入サポート".to_string(),
            placeholder: "メッセージを入力...".to_string(),
            greeting: "こんにちは！LINE公式アカウント導入についてご質問がございましたら、お気軽にお聞かせください。"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxLayer {
    pub selector: String,
    /// Fraction of the page scroll the layer moves by.
    pub speed: f64,
    /// Inline `transition` set once at startup, if any.
    pub transition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsSettings {
    pub typewriter_selector: String,
    pub typewriter_start_delay_ms: u32,
    pub typewriter_char_delay_ms: u32,
    pub parallax: Vec<ParallaxLayer>,
    /// Body class present while the visitor navigates with Tab.
    pub keyboard_class: String,
}

impl Default for ParallaxLayer {
    fn default() -> Self {
        Self {
            selector: String::new(),
            speed: 0.0,
            transition: None,
        }
    }
}

impl Default for EffectsSettings {
    fn default() -> Self {
        Self {
            typewriter_selector: ".typewriter".to_string(),
            typewriter_start_delay_ms: 1000,
            typewriter_char_delay_ms: 50,
            parallax: vec![
                ParallaxLayer {
                    selector: ".hero-shapes".to_string(),
                    speed: 0.5,
                    transition: Some("transform 0.1s ease-out".to_string()),
                },
                ParallaxLayer {
                    selector: ".phone-mockup".to_string(),
                    speed: 0.3,
                    transition: None,
                },
            ],
            keyboard_class: "keyboard-navigation".to_string(),
        }
    }
}

/// Page-wide configuration for every enhancement component.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub reveal: RevealSettings,
    pub counter: CounterSettings,
    pub nav: NavSettings,
    pub menu: MenuSettings,
    pub form: FormSettings,
    pub chat: ChatSettings,
    pub effects: EffectsSettings,
}

impl SiteConfig {
    /// Layers an optional JSON document over the built-in defaults.
    pub fn from_json(raw: &str) -> ConfigResult<Self> {
        let figment = Figment::from(Serialized::defaults(Self::default())).merge(Json::string(raw));
        let config = figment
            .extract::<Self>()
            .map_err(Box::new)
            .context(ExtractSnafu {
                stage: "extract-site-config",
            })?;
        config.validated()
    }

    /// Like [`Self::from_json`], but any failure falls back to defaults.
    pub fn from_json_or_default(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
            tracing::info!("no inline site config, using defaults");
            return Self::default();
        };

        match Self::from_json(raw) {
            Ok(config) => config,
            Err(error) => {
                tracing::warn!("failed to load site config: {}. using defaults", error);
                Self::default()
            }
        }
    }

    /// Checks value ranges and trims selector strings.
    pub fn validated(mut self) -> ConfigResult<Self> {
        ensure!(
            (0.0..=1.0).contains(&self.reveal.threshold),
            InvalidValueSnafu {
                stage: "validate-site-config",
                field: "reveal.threshold",
                details: format!("{} is outside [0, 1]", self.reveal.threshold),
            }
        );
        ensure!(
            (0.0..=1.0).contains(&self.form.success_rate),
            InvalidValueSnafu {
                stage: "validate-site-config",
                field: "form.success_rate",
                details: format!("{} is outside [0, 1]", self.form.success_rate),
            }
        );
        ensure!(
            self.nav.fixed_padding.is_finite(),
            InvalidValueSnafu {
                stage: "validate-site-config",
                field: "nav.fixed_padding",
                details: "padding must be finite".to_string(),
            }
        );
        ensure!(
            self.menu.mobile_breakpoint.is_finite() && self.menu.mobile_breakpoint >= 0.0,
            InvalidValueSnafu {
                stage: "validate-site-config",
                field: "menu.mobile_breakpoint",
                details: format!("{} is not a usable width", self.menu.mobile_breakpoint),
            }
        );

        if let Some(layer) = self
            .effects
            .parallax
            .iter()
            .find(|layer| !layer.speed.is_finite())
        {
            return InvalidValueSnafu {
                stage: "validate-site-config",
                field: "effects.parallax.speed",
                details: format!("`{}` has a non-finite speed", layer.selector),
            }
            .fail();
        }

        self.reveal.selectors = self
            .reveal
            .selectors
            .into_iter()
            .map(|selector| selector.trim().to_string())
            .filter(|selector| !selector.is_empty())
            .collect();
        self.counter.selector = self.counter.selector.trim().to_string();
        self.form.form_id = self.form.form_id.trim().to_string();
        self.menu.toggle_id = self.menu.toggle_id.trim().to_string();
        self.menu.panel_id = self.menu.panel_id.trim().to_string();
        self.effects
            .parallax
            .retain(|layer| !layer.selector.trim().is_empty());

        Ok(self)
    }
}

/// Shared, swappable handle to the active configuration.
pub struct ConfigStore {
    config: ArcSwap<SiteConfig>,
}

impl ConfigStore {
    pub fn new(config: SiteConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
        }
    }

    pub fn load(raw: Option<&str>) -> Self {
        Self::new(SiteConfig::from_json_or_default(raw))
    }

    pub fn current(&self) -> Arc<SiteConfig> {
        self.config.load_full()
    }

    /// Validates and swaps in a new configuration.
    pub fn update(&self, config: SiteConfig) -> ConfigResult<()> {
        let config = config.validated()?;
        self.config.store(Arc::new(config));
        tracing::info!("site config updated");
        Ok(())
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(SiteConfig::default())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("failed to extract site config on `{stage}`: {source}"))]
    Extract {
        stage: &'static str,
        source: Box<figment::Error>,
    },
    #[snafu(display("invalid site config value `{field}` on `{stage}`: {details}"))]
    InvalidValue {
        stage: &'static str,
        field: &'static str,
        details: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
