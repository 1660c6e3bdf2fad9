//! Statistics counters and voucher tiers
//!
//! Client-reported totals and server-granted voucher counts live in the
//! same row but merge differently: counters replace, vouchers add.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use super::ValidationError;

/// Client-reported cumulative counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatCounter {
    PlayTime,
    Battles,
    ClassicSessionsPlayed,
    SessionsWon,
    HighestEndlessWave,
    HighestLevel,
    PokemonSeen,
    PokemonDefeated,
    PokemonCaught,
    PokemonHatched,
    EggsPulled,
}

impl StatCounter {
    pub const ALL: [StatCounter; 11] = [
        Self::PlayTime,
        Self::Battles,
        Self::ClassicSessionsPlayed,
        Self::SessionsWon,
        Self::HighestEndlessWave,
        Self::HighestLevel,
        Self::PokemonSeen,
        Self::PokemonDefeated,
        Self::PokemonCaught,
        Self::PokemonHatched,
        Self::EggsPulled,
    ];

    /// Name used by game clients
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayTime => "playTime",
            Self::Battles => "battles",
            Self::ClassicSessionsPlayed => "classicSessionsPlayed",
            Self::SessionsWon => "sessionsWon",
            Self::HighestEndlessWave => "highestEndlessWave",
            Self::HighestLevel => "highestLevel",
            Self::PokemonSeen => "pokemonSeen",
            Self::PokemonDefeated => "pokemonDefeated",
            Self::PokemonCaught => "pokemonCaught",
            Self::PokemonHatched => "pokemonHatched",
            Self::EggsPulled => "eggsPulled",
        }
    }

    /// Column in `account_stats`
    pub fn column(&self) -> &'static str {
        match self {
            Self::PlayTime => "play_time",
            Self::Battles => "battles",
            Self::ClassicSessionsPlayed => "classic_sessions_played",
            Self::SessionsWon => "sessions_won",
            Self::HighestEndlessWave => "highest_endless_wave",
            Self::HighestLevel => "highest_level",
            Self::PokemonSeen => "pokemon_seen",
            Self::PokemonDefeated => "pokemon_defeated",
            Self::PokemonCaught => "pokemon_caught",
            Self::PokemonHatched => "pokemon_hatched",
            Self::EggsPulled => "eggs_pulled",
        }
    }
}

impl FromStr for StatCounter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidVariant {
                field: "stat counter",
                value: s.to_owned(),
            })
    }
}

impl fmt::Display for StatCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Voucher tier, carried on the wire as "0".."3"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VoucherTier {
    Regular,
    Plus,
    Premium,
    Golden,
}

impl VoucherTier {
    pub const ALL: [VoucherTier; 4] = [Self::Regular, Self::Plus, Self::Premium, Self::Golden];

    pub fn code(&self) -> i32 {
        match self {
            Self::Regular => 0,
            Self::Plus => 1,
            Self::Premium => 2,
            Self::Golden => 3,
        }
    }

    pub fn from_code(code: i32) -> Result<Self, ValidationError> {
        match code {
            0 => Ok(Self::Regular),
            1 => Ok(Self::Plus),
            2 => Ok(Self::Premium),
            3 => Ok(Self::Golden),
            other => Err(ValidationError::InvalidVariant {
                field: "voucher tier",
                value: other.to_string(),
            }),
        }
    }

    /// Column in `account_stats`
    pub fn column(&self) -> &'static str {
        match self {
            Self::Regular => "regular_vouchers",
            Self::Plus => "plus_vouchers",
            Self::Premium => "premium_vouchers",
            Self::Golden => "golden_vouchers",
        }
    }
}

impl FromStr for VoucherTier {
    type Err = ValidationError;

    /// Only the exact legacy codes; "01" or "+1" are not aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Self::Regular),
            "1" => Ok(Self::Plus),
            "2" => Ok(Self::Premium),
            "3" => Ok(Self::Golden),
            other => Err(ValidationError::InvalidVariant {
                field: "voucher tier",
                value: other.to_owned(),
            }),
        }
    }
}

/// Convert a loose JSON number into a non-negative `i32` counter value.
fn counter_value(field: &str, value: &Value) -> Result<i32, ValidationError> {
    let Value::Number(number) = value else {
        return Err(ValidationError::InvalidFormat {
            field: field.to_owned(),
            reason: "expected a number",
        });
    };
    let whole = match number.as_i64() {
        Some(n) => n,
        None => match number.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => f as i64,
            _ => {
                return Err(ValidationError::InvalidFormat {
                    field: field.to_owned(),
                    reason: "expected a whole number",
                })
            }
        },
    };
    in_counter_range(field, whole)
}

fn in_counter_range(field: &str, n: i64) -> Result<i32, ValidationError> {
    i32::try_from(n)
        .ok()
        .filter(|n| *n >= 0)
        .ok_or_else(|| ValidationError::OutOfRange {
            field: field.to_owned(),
            min: 0,
            max: i64::from(i32::MAX),
        })
}

/// Sparse set of submitted cumulative counter values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatCounters(BTreeMap<StatCounter, i32>);

impl StatCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, counter: StatCounter, value: i32) -> Self {
        self.0.insert(counter, value);
        self
    }

    pub fn get(&self, counter: StatCounter) -> Option<i32> {
        self.0.get(&counter).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatCounter, i32)> + '_ {
        self.0.iter().map(|(c, v)| (*c, *v))
    }

    /// Parse the client's stats object. Any unknown key or bad value fails
    /// the whole payload.
    pub fn from_json(payload: &Value) -> Result<Self, ValidationError> {
        let Some(object) = payload.as_object() else {
            return Err(ValidationError::InvalidFormat {
                field: "stats".into(),
                reason: "expected an object",
            });
        };
        let mut counters = BTreeMap::new();
        for (key, value) in object {
            let counter: StatCounter = key.parse()?;
            counters.insert(counter, counter_value(key, value)?);
        }
        Ok(Self(counters))
    }
}

/// Voucher counts to add, keyed by tier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoucherDeltas(BTreeMap<VoucherTier, i32>);

impl VoucherDeltas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates when the tier is already present. Negative counts and
    /// totals past `i32::MAX` are rejected.
    pub fn with(mut self, tier: VoucherTier, count: i32) -> Result<Self, ValidationError> {
        self.add(tier, count)?;
        Ok(self)
    }

    fn add(&mut self, tier: VoucherTier, count: i32) -> Result<(), ValidationError> {
        let out_of_range = || ValidationError::OutOfRange {
            field: tier.column().to_owned(),
            min: 0,
            max: i64::from(i32::MAX),
        };
        if count < 0 {
            return Err(out_of_range());
        }
        let total = self.0.entry(tier).or_insert(0);
        *total = total.checked_add(count).ok_or_else(out_of_range)?;
        Ok(())
    }

    pub fn get(&self, tier: VoucherTier) -> Option<i32> {
        self.0.get(&tier).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VoucherTier, i32)> + '_ {
        self.0.iter().map(|(t, v)| (*t, *v))
    }

    /// Parse the legacy string-keyed map (`"0"`..`"3"` to count).
    pub fn from_legacy<K, I>(entries: I) -> Result<Self, ValidationError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, i64)>,
    {
        let mut deltas = Self::new();
        for (key, count) in entries {
            let key = key.as_ref();
            let tier: VoucherTier = key.parse()?;
            deltas.add(tier, in_counter_range(key, count)?)?;
        }
        Ok(deltas)
    }
}

/// Stored per-account totals
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct AccountStats {
    pub uuid: Uuid,
    pub play_time: i32,
    pub battles: i32,
    pub classic_sessions_played: i32,
    pub sessions_won: i32,
    pub highest_endless_wave: i32,
    pub highest_level: i32,
    pub pokemon_seen: i32,
    pub pokemon_defeated: i32,
    pub pokemon_caught: i32,
    pub pokemon_hatched: i32,
    pub eggs_pulled: i32,
    pub regular_vouchers: i32,
    pub plus_vouchers: i32,
    pub premium_vouchers: i32,
    pub golden_vouchers: i32,
}

impl AccountStats {
    pub fn empty(uuid: Uuid) -> Self {
        Self {
            uuid,
            ..Self::default()
        }
    }

    pub fn counter(&self, counter: StatCounter) -> i32 {
        match counter {
            StatCounter::PlayTime => self.play_time,
            StatCounter::Battles => self.battles,
            StatCounter::ClassicSessionsPlayed => self.classic_sessions_played,
            StatCounter::SessionsWon => self.sessions_won,
            StatCounter::HighestEndlessWave => self.highest_endless_wave,
            StatCounter::HighestLevel => self.highest_level,
            StatCounter::PokemonSeen => self.pokemon_seen,
            StatCounter::PokemonDefeated => self.pokemon_defeated,
            StatCounter::PokemonCaught => self.pokemon_caught,
            StatCounter::PokemonHatched => self.pokemon_hatched,
            StatCounter::EggsPulled => self.eggs_pulled,
        }
    }

    pub fn vouchers(&self, tier: VoucherTier) -> i32 {
        match tier {
            VoucherTier::Regular => self.regular_vouchers,
            VoucherTier::Plus => self.plus_vouchers,
            VoucherTier::Premium => self.premium_vouchers,
            VoucherTier::Golden => self.golden_vouchers,
        }
    }
}
