//! Maps free-text destination cities to courier city ids.
//!
//! Resolution is strictly ordered: the operator alias map wins over an exact
//! directory match, which wins over a fuzzy prefix match. Fuzzy matches only
//! become bookings when they clear the configured confidence gate; everything
//! else surfaces as a suggestion list for operator review.

use std::collections::{HashMap, HashSet};

use shipbridge_core::{AppConfig, ResolutionMethod};
use shipbridge_lcs::CityRecord;

const EXACT_CONFIDENCE: f64 = 1.0;
const FUZZY_CONFIDENCE: f64 = 0.9;

const SUGGEST_EXACT: f64 = 1.0;
const SUGGEST_PREFIX: f64 = 0.9;
const SUGGEST_SUBSTRING: f64 = 0.8;
const SUGGEST_TOKEN_WEIGHT: f64 = 0.75;

/// Canonical form used for all city comparisons: lowercase, with runs of
/// non-alphanumeric characters collapsed to single spaces.
#[must_use]
pub fn normalize_city(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

/// A successful automatic resolution, before the confidence gate.
#[derive(Debug, Clone)]
pub struct CityMatch {
    pub city_id: i64,
    pub city_name: Option<String>,
    pub method: ResolutionMethod,
    pub confidence: f64,
}

/// A scored directory entry offered when automatic resolution fails.
#[derive(Debug, Clone)]
pub struct CitySuggestion {
    pub city_id: i64,
    pub city_name: String,
    pub score: f64,
}

/// City resolver over a directory snapshot and an operator alias map.
#[derive(Debug, Clone)]
pub struct CityResolver {
    /// Normalized free-text name -> courier city id.
    aliases: HashMap<String, i64>,
    auto_map: bool,
    min_confidence: f64,
}

impl CityResolver {
    #[must_use]
    pub fn new(aliases: &HashMap<String, i64>, auto_map: bool, min_confidence: f64) -> Self {
        let mut resolver = Self {
            aliases: HashMap::new(),
            auto_map,
            min_confidence,
        };
        resolver.set_alias_map(aliases);
        resolver
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(
            &config.city_aliases,
            config.city_auto_map,
            config.city_min_confidence,
        )
    }

    /// Replaces the alias map. Keys are normalized on the way in, so lookups
    /// match regardless of the operator's casing or punctuation.
    pub fn set_alias_map(&mut self, aliases: &HashMap<String, i64>) {
        self.aliases = aliases
            .iter()
            .map(|(name, id)| (normalize_city(name), *id))
            .collect();
    }

    /// Resolves a free-text city against the directory.
    ///
    /// Alias and exact matches carry confidence 1.0. The fuzzy step accepts a
    /// prefix relation in either direction and takes the first directory
    /// entry that matches, at confidence 0.9. Returns `None` when nothing
    /// matches at all.
    #[must_use]
    pub fn resolve(&self, input: &str, cities: &[CityRecord]) -> Option<CityMatch> {
        let needle = normalize_city(input);
        if needle.is_empty() {
            return None;
        }

        if let Some(&city_id) = self.aliases.get(&needle) {
            let city_name = cities.iter().find(|c| c.id == city_id).map(|c| c.name.clone());
            return Some(CityMatch {
                city_id,
                city_name,
                method: ResolutionMethod::Alias,
                confidence: EXACT_CONFIDENCE,
            });
        }

        if let Some(city) = cities.iter().find(|c| normalize_city(&c.name) == needle) {
            return Some(CityMatch {
                city_id: city.id,
                city_name: Some(city.name.clone()),
                method: ResolutionMethod::Exact,
                confidence: EXACT_CONFIDENCE,
            });
        }

        // First prefix match in directory order wins. With a long needle this
        // is safe; very short inputs are caught by the confidence gate or the
        // operator reviewing suggestions.
        let fuzzy = cities.iter().find(|c| {
            let name = normalize_city(&c.name);
            name.starts_with(&needle) || needle.starts_with(&name)
        });

        fuzzy.map(|city| CityMatch {
            city_id: city.id,
            city_name: Some(city.name.clone()),
            method: ResolutionMethod::Fuzzy,
            confidence: FUZZY_CONFIDENCE,
        })
    }

    /// Whether a match may be written to the order without operator review.
    /// Alias and exact matches always pass; fuzzy matches need auto-mapping
    /// enabled and confidence at or above the configured floor.
    #[must_use]
    pub fn auto_accepts(&self, candidate: &CityMatch) -> bool {
        match candidate.method {
            ResolutionMethod::Exact | ResolutionMethod::Alias | ResolutionMethod::Manual => true,
            ResolutionMethod::Fuzzy => {
                self.auto_map && candidate.confidence >= self.min_confidence
            }
        }
    }

    /// Scores every directory entry against the input and returns the top
    /// `limit`, best first. Scores: exact 1.0, prefix 0.9, substring 0.8,
    /// otherwise 0.75 weighted by token overlap.
    #[must_use]
    pub fn suggest(&self, input: &str, cities: &[CityRecord], limit: usize) -> Vec<CitySuggestion> {
        let needle = normalize_city(input);
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let needle_tokens: HashSet<&str> = needle.split_whitespace().collect();
        let mut scored: Vec<CitySuggestion> = cities
            .iter()
            .filter_map(|city| {
                let score = score_candidate(&needle, &needle_tokens, &normalize_city(&city.name));
                (score > 0.0).then(|| CitySuggestion {
                    city_id: city.id,
                    city_name: city.name.clone(),
                    score,
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        scored
    }
}

fn score_candidate(needle: &str, needle_tokens: &HashSet<&str>, name: &str) -> f64 {
    if name == needle {
        return SUGGEST_EXACT;
    }
    if name.starts_with(needle) || needle.starts_with(name) {
        return SUGGEST_PREFIX;
    }
    if name.contains(needle) || needle.contains(name) {
        return SUGGEST_SUBSTRING;
    }

    let name_tokens: HashSet<&str> = name.split_whitespace().collect();
    let intersection = needle_tokens.intersection(&name_tokens).count();
    let union = needle_tokens.union(&name_tokens).count();
    if union == 0 || intersection == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let jaccard = intersection as f64 / union as f64;
    SUGGEST_TOKEN_WEIGHT * jaccard
}
