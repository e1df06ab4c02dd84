//! Static place, region and ZIP tables. Read-only after first access.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::core::geo::GeoPoint;


#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    /// Lower-case lookup key as it appears in a normalized query.
    pub key: &'static str,
    pub name: &'static str,
    pub center: GeoPoint,
}


#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub code: &'static str,
    pub name: &'static str,
    pub center: GeoPoint,
}

macro_rules! place {
    ($key:expr, $name:expr, $lat:expr, $lng:expr) => {
        Place { key: $key, name: $name, center: GeoPoint { lat: $lat, lng: $lng } }
    };
}

lazy_static! {
    pub static ref PLACES: Vec<Place> = vec![
        place!("indianapolis", "Indianapolis", 39.7684, -86.1581),
        place!("carmel", "Carmel", 39.9784, -86.1180),
        place!("fishers", "Fishers", 39.9568, -86.0134),
        place!("noblesville", "Noblesville", 40.0456, -86.0086),
        place!("westfield", "Westfield", 40.0428, -86.1275),
        place!("zionsville", "Zionsville", 39.9509, -86.2619),
        place!("greenwood", "Greenwood", 39.6137, -86.1067),
        place!("avon", "Avon", 39.7628, -86.3997),
        place!("plainfield", "Plainfield", 39.7042, -86.3994),
        place!("brownsburg", "Brownsburg", 39.8434, -86.3978),
        place!("lawrence", "Lawrence", 39.8387, -85.9983),
        place!("speedway", "Speedway", 39.8023, -86.2672),
        place!("beech grove", "Beech Grove", 39.7220, -86.0900),
        place!("broad ripple", "Broad Ripple", 39.8681, -86.1416),
        place!("franklin", "Franklin", 39.4806, -86.0550),
        place!("bloomington", "Bloomington", 39.1653, -86.5264),
        place!("lafayette", "Lafayette", 40.4167, -86.8753),
        place!("west lafayette", "West Lafayette", 40.4259, -86.9081),
        place!("muncie", "Muncie", 40.1934, -85.3864),
        place!("anderson", "Anderson", 40.1053, -85.6803),
        place!("kokomo", "Kokomo", 40.4864, -86.1336),
        place!("fort wayne", "Fort Wayne", 41.0793, -85.1394),
        place!("south bend", "South Bend", 41.6764, -86.2520),
        place!("evansville", "Evansville", 37.9716, -87.5711),
        place!("terre haute", "Terre Haute", 39.4667, -87.4139),
    ];

    static ref PLACE_INDEX: HashMap<&'static str, usize> = PLACES
        .iter()
        .enumerate()
        .map(|(i, p)| (p.key, i))
        .collect();

    /// State keyword (as typed) to region.
    pub static ref REGIONS: Vec<(&'static str, Region)> = vec![
        ("indiana", Region { code: "IN", name: "Indiana", center: GeoPoint { lat: 39.8942, lng: -86.2816 } }),
        ("ohio", Region { code: "OH", name: "Ohio", center: GeoPoint { lat: 40.4173, lng: -82.9071 } }),
        ("illinois", Region { code: "IL", name: "Illinois", center: GeoPoint { lat: 40.6331, lng: -89.3985 } }),
        ("kentucky", Region { code: "KY", name: "Kentucky", center: GeoPoint { lat: 37.8393, lng: -84.2700 } }),
        ("michigan", Region { code: "MI", name: "Michigan", center: GeoPoint { lat: 44.3148, lng: -85.6024 } }),
    ];

    static ref ZIP_CENTROIDS: HashMap<&'static str, GeoPoint> = {
        let mut m = HashMap::new();
        m.insert("46201", GeoPoint { lat: 39.7745, lng: -86.1090 });
        m.insert("46202", GeoPoint { lat: 39.7838, lng: -86.1614 });
        m.insert("46204", GeoPoint { lat: 39.7717, lng: -86.1569 });
        m.insert("46205", GeoPoint { lat: 39.8257, lng: -86.1378 });
        m.insert("46208", GeoPoint { lat: 39.8183, lng: -86.1748 });
        m.insert("46220", GeoPoint { lat: 39.8681, lng: -86.1080 });
        m.insert("46240", GeoPoint { lat: 39.9059, lng: -86.1237 });
        m.insert("46250", GeoPoint { lat: 39.9037, lng: -86.0650 });
        m.insert("46256", GeoPoint { lat: 39.9073, lng: -86.0108 });
        m.insert("46032", GeoPoint { lat: 39.9690, lng: -86.1647 });
        m.insert("46033", GeoPoint { lat: 39.9810, lng: -86.0870 });
        m.insert("46037", GeoPoint { lat: 39.9610, lng: -85.9560 });
        m.insert("46038", GeoPoint { lat: 39.9672, lng: -86.0150 });
        m.insert("46060", GeoPoint { lat: 40.0636, lng: -85.9928 });
        m.insert("46074", GeoPoint { lat: 40.0416, lng: -86.1744 });
        m.insert("46077", GeoPoint { lat: 39.9490, lng: -86.2830 });
        m.insert("46112", GeoPoint { lat: 39.8590, lng: -86.3810 });
        m.insert("46123", GeoPoint { lat: 39.7600, lng: -86.4000 });
        m.insert("46142", GeoPoint { lat: 39.6200, lng: -86.1740 });
        m.insert("46143", GeoPoint { lat: 39.5970, lng: -86.1150 });
        m.insert("46168", GeoPoint { lat: 39.6880, lng: -86.3910 });
        m
    };
}


pub fn find_place(key: &str) -> Option<&'static Place> {
    PLACE_INDEX.get(key.trim().to_lowercase().as_str()).map(|&i| &PLACES[i])
}


/// Places whose key occurs as whole words in a normalized query.
pub fn places_in(normalized: &str) -> Vec<&'static Place> {
    let padded = format!(" {} ", normalized);
    PLACES
        .iter()
        .filter(|p| padded.contains(&format!(" {} ", p.key)))
        .collect()
}


pub fn region_by_code(code: &str) -> Option<&'static Region> {
    REGIONS
        .iter()
        .map(|(_, r)| r)
        .find(|r| r.code.eq_ignore_ascii_case(code.trim()))
}


/// Region codes for state keywords occurring as whole words in a normalized query.
pub fn regions_in(normalized: &str) -> Vec<&'static Region> {
    let padded = format!(" {} ", normalized);
    REGIONS
        .iter()
        .filter(|(k, _)| padded.contains(&format!(" {} ", k)))
        .map(|(_, r)| r)
        .collect()
}


pub fn zip_centroid(zip: &str) -> Option<GeoPoint> {
    ZIP_CENTROIDS.get(zip.trim()).copied()
}
