//! Named fixture sets for parametrized device tests.
//!
//! Each set lists fixtures that exercise the same device family. Multi-file
//! entries are merged in order, so a hub snapshot can be extended with the
//! children paired to it.

/// Smart plugs.
pub const PLUGS: &[&str] = &["p100.json", "p105.json"];

/// Power strips with per-socket children.
pub const PLUG_STRIPS: &[&str] = &["p300.json"];

/// Color bulbs and light strips.
pub const BULBS: &[&str] = &["l930.json", "l630.json", "l530.json"];

/// LED strips supporting lighting effects.
pub const LED_STRIPS: &[&str] = &["l930.json"];

/// Hubs without children.
pub const HUBS: &[&str] = &["h100.json"];

/// Hub whose child list spans several pages.
pub const HUB_LOT_DEVICES: &[&str] = &["h100_lot_devices.json"];

/// Hub with a paired KE100 thermostatic radiator valve.
pub const TRVS: &[&[&str]] = &[&["h100.json", "hub_children/trv_ke100.json"]];

/// Every single-file fixture in the catalog, without duplicates.
pub fn single_fixtures() -> Vec<&'static str> {
    let mut all: Vec<&'static str> =
        [PLUGS, PLUG_STRIPS, BULBS, LED_STRIPS, HUBS, HUB_LOT_DEVICES].concat();
    all.sort_unstable();
    all.dedup();
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_fixtures_are_deduplicated() {
        let all = single_fixtures();
        assert_eq!(all.iter().filter(|name| **name == "l930.json").count(), 1);
        assert!(all.contains(&"h100.json"));
    }

    #[test]
    fn trv_set_layers_child_over_hub() {
        assert_eq!(TRVS[0].first(), Some(&"h100.json"));
        assert_eq!(TRVS[0].last(), Some(&"hub_children/trv_ke100.json"));
    }

    #[test]
    fn lot_devices_hub_is_a_single_fixture() {
        assert!(BULBS.contains(&"l630.json"));
        assert!(single_fixtures().contains(&"h100_lot_devices.json"));
    }
}
