//! Utility functions

use rand::RngExt;

pub const INVITE_CODE_LENGTH: usize = 16;
pub const SAFE: [char; 62] = [
	'0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
	'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
	'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
	'V', 'W', 'X', 'Y', 'Z',
];

/// Generate a random alphanumeric id of the given length
pub fn random_id(len: usize) -> String {
	let mut rng = rand::rng();
	let mut result = String::with_capacity(len);

	for _ in 0..len {
		result.push(SAFE[rng.random_range(0..SAFE.len())]);
	}
	result
}

/// Generate a fresh invite code
pub fn invite_code() -> String {
	random_id(INVITE_CODE_LENGTH)
}


// vim: ts=4
