//! Built-in records the store starts with.

use super::model::Heroe;

const SEED: &[(&str, Option<&str>, &str, &str, &str)] = &[
    (
        "7eb7c859-1347-4317-96b6-9476a7e2ba3c",
        Some("10001"),
        "Spider-Man",
        "Bitten by a radioactive spider, Peter Parker gained the proportional strength and agility of an arachnid.",
        "Marvel",
    ),
    (
        "2d8a7c5e-4e0f-4b7d-9f6a-3c1b2e4d5f60",
        Some("10002"),
        "Batman",
        "Billionaire Bruce Wayne fights crime in Gotham City with intellect, gadgets and martial arts.",
        "DC",
    ),
    (
        "9c1f3e2a-6b4d-4a8e-b2c7-5d9e0f1a2b3c",
        Some("10003"),
        "Wonder Woman",
        "Diana, princess of the Amazons, carries the Lasso of Truth.",
        "DC",
    ),
    (
        "4a6b8c0d-2e1f-4c3b-a5d7-e9f0a1b2c3d4",
        Some("10004"),
        "Iron Man",
        "Tony Stark built a powered suit of armor to escape captivity.",
        "Marvel",
    ),
    (
        "b3c4d5e6-f7a8-4b9c-8d0e-1f2a3b4c5d6e",
        None,
        "Superman",
        "The last son of Krypton draws his powers from the yellow sun.",
        "DC",
    ),
];

/// The default record set.
pub fn default_heroes() -> Vec<Heroe> {
    SEED.iter()
        .map(|(id, code, name, description, company)| Heroe {
            id: id.to_string(),
            code: code.map(str::to_string),
            name: name.to_string(),
            description: description.to_string(),
            company: company.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guid::is_guid;
    use std::collections::HashSet;

    #[test]
    fn test_seed_ids_are_unique_guids() {
        let heroes = default_heroes();
        let ids: HashSet<&str> = heroes.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids.len(), heroes.len());
        assert!(heroes.iter().all(|h| is_guid(&h.id)));
    }
}
