//! Playlist values and the argument object of `loadPlaylist` / `cuePlaylist`.

use serde::{Deserialize, Serialize};

/// A playlist as the host declares it.
///
/// Equality is structural: two video lists are equal iff they hold the same ids
/// in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Playlist {
	/// A playlist id known to the player.
	Id(String),
	/// An ordered list of video ids.
	Videos(Vec<String>),
}

impl Playlist {
	/// Builds the argument object for a load/cue call starting at `index`.
	pub fn request(&self, index: u32) -> PlaylistRequest {
		match self {
			Self::Id(id) => PlaylistRequest {
				list_type: Some("playlist".to_string()),
				list: Some(id.clone()),
				playlist: None,
				index,
			},
			Self::Videos(ids) => PlaylistRequest {
				list_type: None,
				list: None,
				playlist: Some(ids.join(",")),
				index,
			},
		}
	}
}

/// Argument object for `loadPlaylist` / `cuePlaylist`.
///
/// The embedded API treats a missing field as undefined, so `None` fields are
/// omitted instead of sent as null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRequest {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub list_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub list: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub playlist: Option<String>,
	pub index: u32,
}
