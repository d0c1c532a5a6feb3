//! Bearer token authentication
//!
//! Tokens are issued elsewhere; this module only verifies HS256 access
//! tokens whose `sub` claim carries the numeric account id.

use axum::{
	extract::{Request, State},
	http::header,
	middleware::Next,
	response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::extract::Auth;
use crate::prelude::*;

/// Authenticated caller
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthCtx {
	pub account_id: AccountId,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AccessClaims<S> {
	pub sub: S,
	pub exp: u64,
}

/// Verify an access token and return the caller it names
pub fn validate_token(key: &DecodingKey, token: &str) -> ClResult<AuthCtx> {
	let token_data =
		decode::<AccessClaims<Box<str>>>(token, key, &Validation::new(Algorithm::HS256))
			.map_err(|err| {
				debug!("Token rejected: {}", err);
				Error::Unauthorized
			})?;

	let account_id = token_data.claims.sub.parse::<u32>().map_err(|_| Error::Unauthorized)?;
	Ok(AuthCtx { account_id: AccountId(account_id) })
}

fn bearer_token(req: &Request) -> Option<&str> {
	req.headers()
		.get(header::AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.and_then(|h| h.strip_prefix("Bearer "))
		.map(str::trim)
}

pub async fn require_auth(
	State(app): State<App>,
	mut req: Request,
	next: Next,
) -> ClResult<Response> {
	let token = bearer_token(&req).ok_or(Error::Unauthorized)?;
	let auth = validate_token(&app.jwt_key, token)?;

	req.extensions_mut().insert(Auth(auth));

	Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
	use super::*;
	use jsonwebtoken::{EncodingKey, Header, encode};

	const SECRET: &[u8] = b"test secret";

	fn token(sub: &str, exp: u64) -> String {
		encode(
			&Header::new(Algorithm::HS256),
			&AccessClaims { sub, exp },
			&EncodingKey::from_secret(SECRET),
		)
		.unwrap()
	}

	fn far_future() -> u64 {
		u64::try_from(Timestamp::now().add_seconds(3600).0).unwrap()
	}

	#[test]
	fn test_valid_token() {
		let key = DecodingKey::from_secret(SECRET);
		let auth = validate_token(&key, &token("42", far_future())).unwrap();
		assert_eq!(auth.account_id, AccountId(42));
	}

	#[test]
	fn test_rejected_tokens() {
		let key = DecodingKey::from_secret(SECRET);
		assert!(matches!(validate_token(&key, &token("42", 1_000)), Err(Error::Unauthorized)));
		assert!(matches!(validate_token(&key, &token("alice", far_future())), Err(Error::Unauthorized)));
		assert!(matches!(validate_token(&key, "not-a-jwt"), Err(Error::Unauthorized)));

		let other_key = DecodingKey::from_secret(b"other secret");
		assert!(matches!(
			validate_token(&other_key, &token("42", far_future())),
			Err(Error::Unauthorized)
		));
	}
}

// vim: ts=4
