use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Privacy toggles shown on the settings screen.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub local_encryption: bool,
    pub sms_parsing: bool,
    pub anonymous_mode: bool
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            local_encryption: true,
            sms_parsing: true,
            anonymous_mode: false
        }
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::LocalEncryption => self.local_encryption,
            SettingKey::SmsParsing => self.sms_parsing,
            SettingKey::AnonymousMode => self.anonymous_mode
        }
    }

    pub fn toggle(&mut self, key: SettingKey) -> bool {
        let flag = match key {
            SettingKey::LocalEncryption => &mut self.local_encryption,
            SettingKey::SmsParsing => &mut self.sms_parsing,
            SettingKey::AnonymousMode => &mut self.anonymous_mode
        };
        *flag = !*flag;
        *flag
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SettingKey {
    LocalEncryption,
    SmsParsing,
    AnonymousMode
}

impl SettingKey {
    pub const ALL: [SettingKey; 3] = [SettingKey::LocalEncryption, SettingKey::SmsParsing, SettingKey::AnonymousMode];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::LocalEncryption => "local-encryption",
            SettingKey::SmsParsing => "sms-parsing",
            SettingKey::AnonymousMode => "anonymous-mode"
        }
    }
}

impl Display for SettingKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL.into_iter()
            .find(|key| key.as_str() == value.trim().to_lowercase())
            .ok_or_else(|| format!("unknown setting '{value}', expected one of: local-encryption, sms-parsing, anonymous-mode"))
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Sat,
    Bn,
    Hi
}

impl Language {
    pub const ALL: [Language; 4] = [Language::En, Language::Sat, Language::Bn, Language::Hi];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Sat => "sat",
            Language::Bn => "bn",
            Language::Hi => "hi"
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Sat => "Santali",
            Language::Bn => "Bengali",
            Language::Hi => "Hindi"
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Language::ALL.into_iter()
            .find(|language| language.code() == value.trim().to_lowercase())
            .ok_or_else(|| format!("unknown language '{value}', expected one of: en, sat, bn, hi"))
    }
}
