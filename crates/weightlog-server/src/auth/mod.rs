// SPDX-License-Identifier: Apache-2.0

mod extractor;
mod password;
mod token;

pub use extractor::AuthUser;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenError, TokenSigner};
