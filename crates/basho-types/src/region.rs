use serde::Serialize;

/// One of the nine fixed geographic groupings of prefectures.
///
/// Regions are static and never persisted. Together their
/// `prefecture_codes` cover 1..=47 exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Region {
    /// Japanese name (e.g. "関東").
    pub name: &'static str,
    /// English name (e.g. "Kanto").
    pub name_en: &'static str,
    /// Member prefecture codes in ascending order.
    pub prefecture_codes: &'static [u8],
}

const REGIONS: [Region; 9] = [
    Region {
        name: "北海道",
        name_en: "Hokkaido",
        prefecture_codes: &[1],
    },
    Region {
        name: "東北",
        name_en: "Tohoku",
        prefecture_codes: &[2, 3, 4, 5, 6, 7],
    },
    Region {
        name: "関東",
        name_en: "Kanto",
        prefecture_codes: &[8, 9, 10, 11, 12, 13, 14],
    },
    Region {
        name: "中部",
        name_en: "Chubu",
        prefecture_codes: &[15, 16, 17, 18, 19, 20, 21, 22, 23],
    },
    Region {
        name: "近畿",
        name_en: "Kinki",
        prefecture_codes: &[24, 25, 26, 27, 28, 29, 30],
    },
    Region {
        name: "中国",
        name_en: "Chugoku",
        prefecture_codes: &[31, 32, 33, 34, 35],
    },
    Region {
        name: "四国",
        name_en: "Shikoku",
        prefecture_codes: &[36, 37, 38, 39],
    },
    Region {
        name: "九州",
        name_en: "Kyushu",
        prefecture_codes: &[40, 41, 42, 43, 44, 45, 46],
    },
    Region {
        name: "沖縄",
        name_en: "Okinawa",
        prefecture_codes: &[47],
    },
];

impl Region {
    /// All nine regions, north to south.
    pub fn all() -> &'static [Region] {
        &REGIONS
    }

    /// Find a region by its Japanese or English name.
    pub fn find(name: &str) -> Option<&'static Region> {
        REGIONS.iter().find(|r| r.name == name || r.name_en == name)
    }

    /// The region a prefecture code belongs to.
    pub fn containing(prefecture_code: u8) -> Option<&'static Region> {
        REGIONS.iter().find(|r| r.prefecture_codes.contains(&prefecture_code))
    }
}
