use lazy_static::lazy_static;
use regex::Regex;

use super::models::{Availability, Quality, SizeFilter};


/// Canonical tag with the patterns that select it and the patterns that veto it.
pub struct TypePattern {
    pub tag: &'static str,
    pub patterns: Vec<Regex>,
    pub excludes: Vec<Regex>,
}

impl TypePattern {
    fn new(tag: &'static str, patterns: &[&str], excludes: &[&str]) -> Self {
        Self {
            tag,
            patterns: compile(patterns),
            excludes: compile(excludes),
        }
    }

    pub fn matches(&self, query: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(query))
            && !self.excludes.iter().any(|re| re.is_match(query))
    }
}


fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| Regex::new(&format!("(?i){}", p)).ok())
        .collect()
}


#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterEffect {
    Availability(Availability),
    Mobile,
    Quality(Quality),
    Organic,
    Senior,
    Puppy,
    Size(SizeFilter),
}

lazy_static! {
    pub static ref SERVICE_PATTERNS: Vec<TypePattern> = vec![
        TypePattern::new("groomer", &[r"\bgroom(er|ers|ing)?\b", r"\bnail trim(s|ming)?\b", r"\bdog wash\b"], &[r"\bgrooming supplies\b"]),
        TypePattern::new("veterinarian", &[r"\bvets?\b", r"\bveterinar(y|ian|ians)\b", r"\banimal (hospital|clinic)s?\b", r"\bpet clinics?\b", r"\bvaccin(e|es|ation|ations)\b", r"\bspay(ed|ing)?\b", r"\bneuter(ed|ing)?\b"], &[]),
        TypePattern::new("dog_park", &[r"\bdog parks?\b", r"\boff leash\b", r"\bbark parks?\b"], &[]),
        TypePattern::new("boarding", &[r"\bboarding\b", r"\bkennels?\b", r"\b(pet|dog) hotels?\b"], &[]),
        TypePattern::new("daycare", &[r"\b(doggy |doggie |dog )?day ?care\b"], &[]),
        TypePattern::new("trainer", &[r"\btrain(er|ers|ing)\b", r"\bobedience\b", r"\bpuppy class(es)?\b"], &[]),
        TypePattern::new("dog_walker", &[r"\bdog walk(er|ers|ing)\b"], &[]),
        TypePattern::new("pet_sitter", &[r"\bpet sit(ter|ters|ting)\b", r"\bhouse sit(ter|ters|ting)\b"], &[]),
    ];

    pub static ref PRODUCT_PATTERNS: Vec<TypePattern> = vec![
        TypePattern::new("dog_food", &[r"\bdog food\b", r"\bkibble\b", r"\bpuppy food\b"], &[]),
        TypePattern::new("cat_food", &[r"\bcat food\b", r"\bkitten food\b"], &[]),
        TypePattern::new("treats", &[r"\btreats?\b", r"\bchews?\b", r"\bbiscuits?\b"], &[]),
        TypePattern::new("toys", &[r"\btoys?\b"], &[r"\btoy breeds?\b"]),
        TypePattern::new("bed", &[r"\b(dog |pet |cat )?beds?\b"], &[]),
        TypePattern::new("leash", &[r"\bleash(es)?\b", r"\bcollars?\b", r"\bharness(es)?\b"], &[r"\boff leash\b"]),
        TypePattern::new("supplements", &[r"\bsupplements?\b", r"\bvitamins?\b", r"\bjoint care\b"], &[]),
        TypePattern::new("crate", &[r"\bcrates?\b", r"\bcarriers?\b"], &[]),
        TypePattern::new("grooming_supplies", &[r"\bshampoos?\b", r"\bbrush(es)?\b", r"\bgrooming supplies\b"], &[]),
    ];

    /// Evaluated top to bottom; a later match overwrites an earlier one for the
    /// same filter. "24/7 emergency vet" therefore ends up `emergency`.
    pub static ref FILTER_PATTERNS: Vec<(FilterEffect, Regex)> = [
        (FilterEffect::Availability(Availability::AroundTheClock), r"\b(24 ?7|24 hours?|24 hrs?|open late|all night|around the clock)\b"),
        (FilterEffect::Availability(Availability::Emergency), r"\b(emergency|urgent|asap|right now|immediately)\b"),
        (FilterEffect::Mobile, r"\b(mobile|comes? to (me|my home|you)|in home|at home)\b"),
        (FilterEffect::Quality(Quality::Premium), r"\b(premium|luxury|high end|upscale|gourmet)\b"),
        (FilterEffect::Quality(Quality::Budget), r"\b(cheap|affordable|budget|low cost|inexpensive|discount)\b"),
        (FilterEffect::Organic, r"\b(organic|all natural|natural|grain free)\b"),
        (FilterEffect::Senior, r"\b(senior|older|elderly|aging)\b"),
        (FilterEffect::Puppy, r"\b(puppy|puppies)\b"),
        (FilterEffect::Size(SizeFilter::Large), r"\b(large|big|giant) (dog|dogs|breed|breeds)\b"),
        (FilterEffect::Size(SizeFilter::Medium), r"\b(medium|mid size) (dog|dogs|breed|breeds)\b"),
        (FilterEffect::Size(SizeFilter::Small), r"\b((small|tiny|little) (dog|dogs|breed|breeds)|toy breeds?)\b"),
        (FilterEffect::Size(SizeFilter::Any), r"\b(all|any) sizes?\b"),
    ]
    .into_iter()
    .filter_map(|(effect, p)| Regex::new(p).ok().map(|re| (effect, re)))
    .collect();

    pub static ref MIN_RATING_PATTERN: Option<Regex> =
        Regex::new(r"\b([1-5])\s*\+?\s*(?:stars?|rating|rated)\b").ok();

    pub static ref ZIP_PATTERN: Option<Regex> = Regex::new(r"\b\d{5}\b").ok();
}


pub const NEAR_ME_PHRASES: &[&str] = &["near me", "nearby", "near by", "local", "in my area", "around here", "close to me"];


pub const MODIFIERS: &[&str] = &[
    "best", "top", "closest", "nearest", "cheapest", "friendly", "gentle", "experienced",
    "certified", "licensed", "professional", "reliable", "trusted", "quick", "fast", "open",
    "new", "popular", "quiet", "clean", "small", "large", "fenced", "indoor", "outdoor",
];


/// Words that never count as significant search terms.
pub const STOPWORDS: &[&str] = &[
    "the", "and", "for", "near", "with", "from", "that", "this", "are", "any", "all",
    "around", "here", "area", "find", "looking", "need", "want", "some", "best", "top",
    "good", "nearby", "local", "open", "now", "where", "can", "get", "who", "what",
];
