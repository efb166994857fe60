use std::env;

/// Which discount rule wins when priorities tie among non-stackable matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Most recently created rule wins.
    #[default]
    Newest,
    /// A rule naming the item explicitly beats a kind-level rule, which beats
    /// a catalog-wide rule; remaining ties fall back to newest.
    MostSpecific,
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub discount_tie_break: TieBreak,
}

impl Config {
    pub fn from_env() -> Self {
        let discount_tie_break = match env::var("DISCOUNT_TIE_BREAK").as_deref() {
            Ok("most_specific") => TieBreak::MostSpecific,
            _ => TieBreak::Newest,
        };

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            discount_tie_break,
        }
    }
}
