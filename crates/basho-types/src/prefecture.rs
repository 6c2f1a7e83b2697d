use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Administrative type of a prefecture, serialized as its kanji suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrefectureType {
    /// 都 (Tokyo)
    #[serde(rename = "都")]
    To,
    /// 道 (Hokkaido)
    #[serde(rename = "道")]
    Do,
    /// 府 (Kyoto, Osaka)
    #[serde(rename = "府")]
    Fu,
    /// 県 (the remaining 43)
    #[serde(rename = "県")]
    Ken,
}

impl PrefectureType {
    /// The kanji suffix for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::To => "都",
            Self::Do => "道",
            Self::Fu => "府",
            Self::Ken => "県",
        }
    }
}

impl fmt::Display for PrefectureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrefectureType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "都" => Ok(Self::To),
            "道" => Ok(Self::Do),
            "府" => Ok(Self::Fu),
            "県" => Ok(Self::Ken),
            other => Err(TypeError::UnknownPrefectureType(other.to_string())),
        }
    }
}

/// One of the 47 prefectures.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Prefecture {
    /// Prefecture code (1..=47).
    pub code: u8,
    /// Japanese name (e.g. "東京都").
    pub name: String,
    /// English name (e.g. "Tokyo").
    pub name_en: String,
    /// Katakana reading (e.g. "トウキョウト").
    pub name_kana: String,
    /// Hiragana reading (e.g. "とうきょうと").
    pub name_hiragana: String,
    /// Name of the owning [`Region`](crate::Region) (e.g. "関東").
    pub region_name: String,
    #[serde(rename = "type")]
    pub prefecture_type: PrefectureType,
    /// Municipality code of the prefectural capital (e.g. "131041").
    pub capital_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokyo_json() -> &'static str {
        r#"{"code":13,"name":"東京都","name_en":"Tokyo","name_kana":"トウキョウト","name_hiragana":"とうきょうと","region_name":"関東","type":"都","capital_code":"131041"}"#
    }

    #[test]
    fn deserializes_type_field() {
        let pref: Prefecture = serde_json::from_str(tokyo_json()).unwrap();
        assert_eq!(pref.code, 13);
        assert_eq!(pref.prefecture_type, PrefectureType::To);
        assert_eq!(pref.capital_code, "131041");
    }

    #[test]
    fn serializes_losslessly() {
        let pref: Prefecture = serde_json::from_str(tokyo_json()).unwrap();
        let back: serde_json::Value = serde_json::to_value(&pref).unwrap();
        let original: serde_json::Value = serde_json::from_str(tokyo_json()).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn prefecture_type_parse_and_display() {
        for ty in [PrefectureType::To, PrefectureType::Do, PrefectureType::Fu, PrefectureType::Ken] {
            assert_eq!(ty.to_string().parse::<PrefectureType>(), Ok(ty));
        }
        assert_eq!(
            "市".parse::<PrefectureType>(),
            Err(TypeError::UnknownPrefectureType("市".into()))
        );
    }
}
