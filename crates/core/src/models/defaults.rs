//! Built-in starting data used when no snapshot has been saved yet
//! (or the saved one cannot be read).

use super::asset::Asset;
use super::group::{Group, ViewMode};
use super::settings::GlobalSettings;
use super::tag::Tag;

/// Theme colors handed out to new groups, in order.
pub const THEME_PALETTE: [&str; 4] = ["indigo", "amber", "red", "blue"];

/// Pick the theme color for the group created after `existing_groups` others.
#[must_use]
pub fn theme_color_for(existing_groups: usize) -> &'static str {
    THEME_PALETTE[existing_groups % THEME_PALETTE.len()]
}

pub fn initial_settings() -> GlobalSettings {
    GlobalSettings {
        planned_total: 500_000.0,
        a_share_pool: 240_000.0,
        global_pool: 100_000.0,
        cash_usd: 15_000.0,
        cash_jpy: 200_000.0,
        usd_rate: 7.23,
        jpy_rate: 0.047,
    }
}

pub fn initial_tags() -> Vec<Tag> {
    vec![
        Tag::with_id("tag-growth", "High Growth", "rose"),
        Tag::with_id("tag-value", "Value", "blue"),
        Tag::with_id("tag-dividend", "High Dividend", "emerald"),
        Tag::with_id("tag-hedge", "Hedge", "amber"),
        Tag::with_id("tag-cycle", "Cyclical", "orange"),
    ]
}

pub fn initial_assets() -> Vec<Asset> {
    vec![
        Asset::with_id("zijin", "Zijin Mining", 10_365.0)
            .target(8.0)
            .tagged(["tag-value", "tag-hedge", "tag-cycle"]),
        Asset::with_id("nonferrous", "Nonferrous Metals ETF", 0.0)
            .target(5.0)
            .tagged(["tag-growth", "tag-cycle"]),
        Asset::with_id("gold", "Gold ETF", 7_052.0)
            .target(6.0)
            .tagged(["tag-hedge"]),
        Asset::with_id("star50", "STAR 50", 15_400.0)
            .target(12.0)
            .tagged(["tag-growth"]),
        Asset::with_id("chip", "Semiconductor ETF", 12_012.0)
            .target(10.0)
            .tagged(["tag-growth"]),
        Asset::with_id("nvda", "NVDA", 18_000.0)
            .target(15.0)
            .tagged(["tag-growth"]),
        Asset::with_id("qqq", "QQQ", 9_000.0)
            .target(8.0)
            .tagged(["tag-growth", "tag-value"]),
    ]
}

pub fn initial_groups() -> Vec<Group> {
    vec![
        Group {
            id: "res-group".into(),
            name: "Core Resources & Hedge".into(),
            description: "Auto-collected: hedge and cyclical assets".into(),
            target_percent: 19.0,
            asset_ids: Vec::new(),
            tag_ids: vec!["tag-hedge".into(), "tag-cycle".into()],
            theme_color: "amber".into(),
            view_type: ViewMode::Attribution,
        },
        Group {
            id: "tech-group".into(),
            name: "Global Tech Innovation".into(),
            description: "Auto-collected: high growth assets".into(),
            target_percent: 45.0,
            asset_ids: Vec::new(),
            tag_ids: vec!["tag-growth".into()],
            theme_color: "indigo".into(),
            view_type: ViewMode::Attribution,
        },
        Group {
            id: "ashares-group".into(),
            name: "A-Share Core".into(),
            description: "Domestic market, hand-picked".into(),
            target_percent: 60.0,
            asset_ids: ["zijin", "nonferrous", "gold", "star50", "chip"]
                .into_iter()
                .map(String::from)
                .collect(),
            tag_ids: Vec::new(),
            theme_color: "red".into(),
            view_type: ViewMode::Structural,
        },
        Group {
            id: "global-group".into(),
            name: "Global Markets".into(),
            description: "Overseas assets, hand-picked".into(),
            target_percent: 40.0,
            asset_ids: vec!["nvda".into(), "qqq".into()],
            tag_ids: Vec::new(),
            theme_color: "blue".into(),
            view_type: ViewMode::Structural,
        },
    ]
}
