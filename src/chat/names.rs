use rand::seq::SliceRandom;

/// Source of display names handed out at registration.
pub trait NameSupplier: Send + Sync {
    fn next_name(&self) -> String;
}

const FIRST_NAMES: &[&str] = &[
    "Olena", "Taras", "Mariia", "Andrii", "Sofiia", "Dmytro", "Iryna", "Bohdan",
    "Kateryna", "Oleksii", "Nataliia", "Yurii", "Anna", "Maksym", "Oksana", "Serhii",
    "Laura", "James", "Linda", "Robert", "Karen", "Michael", "Susan", "David",
];

const LAST_NAMES: &[&str] = &[
    "Shevchenko", "Kovalenko", "Bondarenko", "Tkachenko", "Kravchenko", "Melnyk",
    "Boyko", "Kovalchuk", "Oliinyk", "Lysenko", "Marchenko", "Savchenko",
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Miller", "Davis", "Wilson",
];

/// Random "First Last" names. Collisions are possible and harmless.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomNames;

impl NameSupplier for RandomNames {
    fn next_name(&self) -> String {
        let mut rng = rand::thread_rng();
        let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Anonymous");
        let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Guest");
        format!("{} {}", first, last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_names_are_first_and_last() {
        let names = RandomNames;
        for _ in 0..50 {
            let name = names.next_name();
            let parts: Vec<&str> = name.split(' ').collect();
            assert_eq!(parts.len(), 2);
            assert!(FIRST_NAMES.contains(&parts[0]));
            assert!(LAST_NAMES.contains(&parts[1]));
        }
    }
}
