// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use rand::Rng;

/// Symbols drawn from when generating credentials.
pub const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Returns `len` symbols drawn uniformly from [`ALPHABET`].
///
/// Uses the thread-local CSPRNG, so values are safe to use as passwords.
pub fn random_alphanumeric(len: usize) -> String {
	let mut rng = rand::thread_rng();
	(0..len)
		.map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
		.collect()
}
