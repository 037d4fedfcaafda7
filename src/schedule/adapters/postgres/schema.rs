//! Diesel schema for scheduled task persistence.

diesel::table! {
    /// Named recurring task definitions with run bookkeeping.
    scheduled_tasks (name) {
        /// Unique task name.
        #[max_length = 100]
        name -> Varchar,
        /// Opaque command identifier.
        #[max_length = 255]
        command -> Varchar,
        /// Time-of-day or cron expression.
        #[max_length = 255]
        schedule -> Varchar,
        /// Optional operator-facing description.
        description -> Nullable<Text>,
        /// Whether the scheduler may dispatch the task.
        is_enabled -> Bool,
        /// Last dispatch timestamp.
        last_run_at -> Nullable<Timestamptz>,
        /// Next expected dispatch timestamp.
        next_run_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Dispatch leases, at most one row per task.
    task_leases (task_name) {
        /// Leased task name.
        #[max_length = 100]
        task_name -> Varchar,
        /// Per-acquisition identifier.
        lease_id -> Uuid,
        /// Holder identity.
        #[max_length = 255]
        owner -> Varchar,
        /// Acquisition timestamp.
        acquired_at -> Timestamptz,
        /// Expiry timestamp.
        expires_at -> Timestamptz,
    }
}
