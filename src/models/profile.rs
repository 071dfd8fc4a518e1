//! Author profiles from the `userProfiles` endpoint.

use serde::Deserialize;

/// Raw `userProfiles.get` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<ProfileName>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileName {
    pub full_name: Option<String>,
}

/// The parts of a profile a message needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorProfile {
    pub full_name: Option<String>,
    pub photo_url: Option<String>,
}

impl From<UserProfile> for AuthorProfile {
    fn from(profile: UserProfile) -> Self {
        Self {
            full_name: profile.name.and_then(|n| n.full_name),
            photo_url: profile.photo_url,
        }
    }
}

/// Outcome of a best-effort profile lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileLookup {
    Found(AuthorProfile),
    NotFound,
}

impl ProfileLookup {
    pub fn full_name(&self) -> Option<&str> {
        match self {
            ProfileLookup::Found(p) => p.full_name.as_deref(),
            ProfileLookup::NotFound => None,
        }
    }

    pub fn photo_url(&self) -> Option<&str> {
        match self {
            ProfileLookup::Found(p) => p.photo_url.as_deref(),
            ProfileLookup::NotFound => None,
        }
    }
}
