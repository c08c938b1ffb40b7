use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Credentials for one account, keyed by name in [`Profiles`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Profile {
    pub access_token: String,
    /// Unix timestamp (seconds) at which `access_token` was issued.
    pub access_token_created: i64,
    /// Lifetime of `access_token` in seconds.
    pub access_token_ttl: i64,
    pub refresh_token: String,
    pub refresh_token_created: i64,
    pub refresh_token_ttl: i64,
    pub default: bool,
    pub email: String,
    /// Session token sent to the management API.
    pub token: String,
}

impl Profile {
    pub fn access_token_expired(&self, now: i64) -> bool {
        self.access_token_ttl > 0 && now >= self.access_token_created + self.access_token_ttl
    }
}

pub type Profiles = BTreeMap<String, Profile>;

pub fn get<'a>(name: &str, profiles: &'a Profiles) -> Option<&'a Profile> {
    profiles.get(name)
}

pub fn default_profile(profiles: &Profiles) -> Option<(&str, &Profile)> {
    profiles
        .iter()
        .find(|(_, p)| p.default)
        .map(|(name, p)| (name.as_str(), p))
}

/// Marks `name` as the default, clearing the flag on every other profile.
/// Returns false if the profile does not exist.
pub fn set_default(name: &str, profiles: &mut Profiles) -> bool {
    if !profiles.contains_key(name) {
        return false;
    }
    for (key, profile) in profiles.iter_mut() {
        profile.default = key == name;
    }
    true
}

/// Ensures some profile is the default, promoting the first by name when
/// none is. Returns the default profile's name, or None when there are no
/// profiles.
pub fn set_a_default(profiles: &mut Profiles) -> Option<String> {
    if let Some((name, _)) = default_profile(profiles) {
        return Some(name.to_string());
    }
    let (name, profile) = profiles.iter_mut().next()?;
    profile.default = true;
    Some(name.clone())
}

/// Removes the named profile. If it was the default another profile is
/// promoted in its place.
pub fn delete(name: &str, profiles: &mut Profiles) -> bool {
    match profiles.remove(name) {
        Some(removed) => {
            if removed.default {
                set_a_default(profiles);
            }
            true
        }
        None => false,
    }
}
