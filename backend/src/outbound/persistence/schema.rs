//! Diesel table definitions for the points ledger.
//!
//! These must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts and their spendable balance.
    users (id) {
        id -> Uuid,
        name -> Text,
        phone -> Text,
        /// One of `USER`, `AGENT`, `KABADIWALA`, `ADMIN`.
        role -> Text,
        /// Never negative; enforced by a CHECK constraint.
        points -> Int8,
        created_at -> Timestamptz,
        /// Argon2id PHC string; `NULL` means the account cannot log in.
        password_hash -> Nullable<Text>,
    }
}

diesel::table! {
    /// Reward catalog.
    rewards (id) {
        id -> Uuid,
        title -> Text,
        description -> Text,
        cost -> Int8,
        is_active -> Bool,
    }
}

diesel::table! {
    /// Redemption requests awaiting fulfilment.
    redemptions (id) {
        id -> Uuid,
        user_id -> Uuid,
        reward_id -> Nullable<Uuid>,
        points_spent -> Int8,
        /// One of `PENDING`, `APPROVED`, `REJECTED`.
        status -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(redemptions -> users (user_id));
diesel::joinable!(redemptions -> rewards (reward_id));

diesel::allow_tables_to_appear_in_same_query!(users, rewards, redemptions);
