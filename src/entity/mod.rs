pub mod needs;
pub mod villager;

pub use needs::{DecayRates, NeedType, Needs};
pub use villager::{Household, Villager, VillagerSnapshot};
