//! The four browsable PokeAPI collections.

/// How a freshly fetched detail payload is enriched before it is cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetailEnrichment {
    /// Follow the species link: flavor text, genus and evolution chain.
    SpeciesFanOut,
    Identity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub page_size: u32,
    pub enrichment: DetailEnrichment,
}

pub const POKEMON: &str = "pokemon";

/// Registry order is the order of left/right category cycling.
pub const CATEGORIES: [CategoryDescriptor; 4] = [
    CategoryDescriptor {
        id: POKEMON,
        label: "POKEMON",
        page_size: 151,
        enrichment: DetailEnrichment::SpeciesFanOut,
    },
    CategoryDescriptor {
        id: "pokemon-species",
        label: "SPECIES",
        page_size: 151,
        enrichment: DetailEnrichment::Identity,
    },
    CategoryDescriptor {
        id: "type",
        label: "TYPES",
        page_size: 18,
        enrichment: DetailEnrichment::Identity,
    },
    CategoryDescriptor {
        id: "version",
        label: "VERSIONS",
        page_size: 30,
        enrichment: DetailEnrichment::Identity,
    },
];

pub fn find(id: &str) -> Option<&'static CategoryDescriptor> {
    CATEGORIES.iter().find(|category| category.id == id)
}

pub fn index_of(id: &str) -> Option<usize> {
    CATEGORIES.iter().position(|category| category.id == id)
}

pub fn at(index: usize) -> &'static CategoryDescriptor {
    &CATEGORIES[index % CATEGORIES.len()]
}

pub fn cycle_index(current: usize, direction: i32) -> usize {
    let count = CATEGORIES.len() as i64;
    let next = (current as i64 + direction as i64 + count).rem_euclid(count);
    next as usize
}
