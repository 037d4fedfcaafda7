//! Diesel schema for resource persistence.

diesel::table! {
    /// Generated resources with attempt log and review decision.
    resources (id) {
        /// Resource identifier.
        id -> Uuid,
        /// Resource kind.
        #[max_length = 50]
        kind -> Varchar,
        /// Generation prompt.
        prompt -> Text,
        /// Submitting actor.
        #[max_length = 255]
        submitted_by -> Varchar,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Object storage key of the artifact.
        #[max_length = 1024]
        artifact_path -> Nullable<Varchar>,
        /// Ordered failed attempts.
        attempts -> Jsonb,
        /// Deciding approver.
        #[max_length = 255]
        approver -> Nullable<Varchar>,
        /// Decision timestamp.
        decided_at -> Nullable<Timestamptz>,
        /// Rejection reason.
        rejection_reason -> Nullable<Text>,
        /// Optimistic concurrency token.
        version -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
