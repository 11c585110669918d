//! Ledger service - the single owner of application state.
//!
//! Every mutating operation follows the same path: access gate, validation,
//! in-memory mutation, activity log entry, then best-effort persistence of the
//! touched collections. A denied caller gets `Ok(None)` (or `Ok(false)`) and
//! nothing changes.

use crate::{
    config::AppConfig,
    core::{
        auth::{self, AuthSession, Scope, SessionState},
        backup::{self, Confirmation, ImportOutcome, Snapshot},
        balance::{self, LunchUpdate},
        debt::{self, DebtUpdate, NewDebt},
        employee,
        expense::{self, NewExpense},
        logs,
        matcher::{Candidate, PaymentMatch},
        state::AppState,
        theme,
    },
    db::{Collection, Persistence},
    errors::{Error, Result},
    models::{AppSettings, DebtRecord, Employee, ExpenseRecord, LunchItem, SessionUser, User},
};
use chrono::{NaiveDate, Utc};

/// Changes to the process-wide settings. `None` keeps the current value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    /// New default charge per meal
    pub cost_per_meal: Option<i64>,
    /// New theme color name
    pub theme_color: Option<String>,
}

/// A payment credited from a matcher result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmedPayment {
    /// Employee after the credit
    pub employee: Employee,
    /// Amount credited
    pub amount: i64,
}

/// Application state plus the stores it is persisted to.
#[derive(Debug)]
pub struct Ledger {
    state: AppState,
    persistence: Persistence,
    config: AppConfig,
    seed_admin: User,
}

/// Session key of a caller in the local store.
#[must_use]
pub fn session_key(caller: &str) -> String {
    format!("session:{caller}")
}

impl Ledger {
    /// Loads every collection, remote values first, and seeds the admin when
    /// no accounts exist yet.
    ///
    /// # Errors
    /// Fails if the local store cannot be read or holds data that no longer
    /// deserializes, or if the admin secret cannot be hashed.
    pub async fn load(
        persistence: Persistence,
        config: AppConfig,
        admin_password: &str,
    ) -> Result<Self> {
        let seed_admin =
            auth::seed_admin(&config.auth.admin_username, admin_password, Utc::now())?;

        let users: Vec<User> = persistence
            .load(Collection::Users)
            .await?
            .unwrap_or_default();
        let needs_admin = users.is_empty();

        let state = AppState {
            employees: persistence
                .load(Collection::Employees)
                .await?
                .unwrap_or_default(),
            lunch_records: persistence
                .load(Collection::LunchRecords)
                .await?
                .unwrap_or_default(),
            expense_records: persistence
                .load(Collection::ExpenseRecords)
                .await?
                .unwrap_or_default(),
            debt_records: persistence
                .load(Collection::DebtRecords)
                .await?
                .unwrap_or_default(),
            settings: persistence
                .load(Collection::Settings)
                .await?
                .unwrap_or_else(|| config.default_settings()),
            logs: persistence.load(Collection::Logs).await?.unwrap_or_default(),
            users: if needs_admin {
                vec![seed_admin.clone()]
            } else {
                users
            },
        };

        let ledger = Self {
            state,
            persistence,
            config,
            seed_admin,
        };
        if needs_admin {
            tracing::info!(
                username = %ledger.seed_admin.username,
                "No accounts found, seeded the admin account"
            );
            ledger.persist(&[Collection::Users]).await;
        }

        tracing::info!(
            employees = ledger.state.employees.len(),
            lunch_days = ledger.state.lunch_records.len(),
            remote = ledger.persistence.has_remote(),
            "Ledger loaded"
        );
        Ok(ledger)
    }

    /// Current state, for read-only views.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Current settings.
    #[must_use]
    pub const fn settings(&self) -> &AppSettings {
        &self.state.settings
    }

    /// Loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    async fn persist(&self, collections: &[Collection]) {
        for &collection in collections {
            match collection {
                Collection::Employees => {
                    self.persistence
                        .save(collection, &self.state.employees)
                        .await;
                }
                Collection::LunchRecords => {
                    self.persistence
                        .save(collection, &self.state.lunch_records)
                        .await;
                }
                Collection::ExpenseRecords => {
                    self.persistence
                        .save(collection, &self.state.expense_records)
                        .await;
                }
                Collection::DebtRecords => {
                    self.persistence
                        .save(collection, &self.state.debt_records)
                        .await;
                }
                Collection::Settings => {
                    self.persistence
                        .save(collection, &self.state.settings)
                        .await;
                }
                Collection::Logs => self.persistence.save(collection, &self.state.logs).await,
                Collection::Users => self.persistence.save(collection, &self.state.users).await,
            }
        }
    }

    fn log(&mut self, actor: &SessionUser, action: &str, details: &str) {
        tracing::info!(actor = %actor.username, action, "{details}");
        logs::append(
            &mut self.state.logs,
            action,
            format!("{}: {details}", actor.username),
            Utc::now(),
        );
    }

    fn gate<'s>(
        session: &'s SessionState,
        scope: Scope<'_>,
        action: &str,
    ) -> Option<&'s SessionUser> {
        let actor = auth::authorize(session, scope, Utc::now());
        if actor.is_none() {
            tracing::warn!(action, ?scope, "Mutation denied");
        }
        actor
    }

    // ---- sessions ----

    /// Restores the caller's session; an expired one is discarded.
    ///
    /// # Errors
    /// Fails if the local store cannot be read.
    pub async fn session(&self, caller: &str) -> Result<SessionState> {
        let key = session_key(caller);
        let stored: Option<AuthSession> = match self.persistence.load_session(&key).await {
            Ok(stored) => stored,
            Err(Error::Serialization(e)) => {
                tracing::warn!(caller, "Discarding unreadable session: {e}");
                None
            }
            Err(e) => return Err(e),
        };

        let had_session = stored.is_some();
        let state = SessionState::restore(stored, Utc::now());
        if had_session && state == SessionState::Anonymous {
            tracing::debug!(caller, "Session expired");
            self.persistence.clear_session(&key).await?;
        }
        Ok(state)
    }

    /// Logs a caller in and persists a fixed-length session.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCredentials`] when the username or secret does
    /// not match, or a store error when the session cannot be saved.
    pub async fn login(&self, caller: &str, username: &str, password: &str) -> Result<SessionUser> {
        let user = auth::login(&self.state.users, username, password)?;
        let session = AuthSession::start(user, Utc::now(), self.config.auth.session_days);
        self.persistence
            .save_session(&session_key(caller), &session)
            .await?;
        tracing::info!(caller, username = %user.username, "Logged in");
        Ok(session.user)
    }

    /// Creates a `user` account and logs the caller into it.
    ///
    /// # Errors
    /// Returns [`Error::UsernameTaken`] or [`Error::Validation`] on bad input.
    pub async fn register(
        &mut self,
        caller: &str,
        username: &str,
        password: &str,
    ) -> Result<SessionUser> {
        let now = Utc::now();
        let user = auth::register(&mut self.state.users, username, password, now)?;
        let session = AuthSession::start(&user, now, self.config.auth.session_days);

        self.log(&session.user, "user.register", &format!("registered {}", user.username));
        self.persist(&[Collection::Users, Collection::Logs]).await;
        self.persistence
            .save_session(&session_key(caller), &session)
            .await?;
        Ok(session.user)
    }

    /// Ends the caller's session.
    ///
    /// # Errors
    /// Fails if the local store cannot be written.
    pub async fn logout(&self, caller: &str) -> Result<()> {
        self.persistence.clear_session(&session_key(caller)).await?;
        tracing::info!(caller, "Logged out");
        Ok(())
    }

    // ---- employees and balances ----

    /// Adds an employee. Admin only.
    ///
    /// # Errors
    /// Returns a validation error for an empty or duplicate name.
    pub async fn add_employee(
        &mut self,
        session: &SessionState,
        name: &str,
    ) -> Result<Option<Employee>> {
        let Some(actor) = Self::gate(session, Scope::Shared, "employee.add") else {
            return Ok(None);
        };

        let employee = employee::add_employee(&mut self.state, name)?;
        self.log(actor, "employee.add", &format!("added {}", employee.name));
        self.persist(&[Collection::Employees, Collection::Logs]).await;
        Ok(Some(employee))
    }

    /// Removes an employee; their lunch items stay as orphans. Admin only.
    ///
    /// # Errors
    /// Returns [`Error::EmployeeNotFound`] for an unknown id.
    pub async fn remove_employee(
        &mut self,
        session: &SessionState,
        employee_id: &str,
    ) -> Result<Option<Employee>> {
        let Some(actor) = Self::gate(session, Scope::Shared, "employee.remove") else {
            return Ok(None);
        };

        let removed = employee::remove_employee(&mut self.state, employee_id)?;
        self.log(
            actor,
            "employee.remove",
            &format!("removed {} (balance {})", removed.name, removed.balance),
        );
        self.persist(&[Collection::Employees, Collection::Logs]).await;
        Ok(Some(removed))
    }

    /// Adds a signed manual adjustment to a balance. Admin only.
    ///
    /// Returns `Ok(None)` when denied or when the employee does not exist.
    ///
    /// # Errors
    /// Returns [`Error::InvalidAmount`] when the balance would overflow.
    pub async fn adjust_balance(
        &mut self,
        session: &SessionState,
        employee_id: &str,
        amount: i64,
    ) -> Result<Option<Employee>> {
        let Some(actor) = Self::gate(session, Scope::Shared, "balance.adjust") else {
            return Ok(None);
        };

        let Some(updated) =
            balance::apply_credit(&mut self.state.employees, employee_id, amount)?.cloned()
        else {
            tracing::debug!(employee_id, "Adjustment for unknown employee ignored");
            return Ok(None);
        };

        self.log(
            actor,
            "balance.adjust",
            &format!("{} {amount:+} -> {}", updated.name, updated.balance),
        );
        self.persist(&[Collection::Employees, Collection::Logs]).await;
        Ok(Some(updated))
    }

    /// Credits a confirmed payment. Admin only.
    ///
    /// Returns `Ok(None)` when denied or when the employee does not exist.
    ///
    /// # Errors
    /// Returns [`Error::InvalidAmount`] unless `amount` is positive, or when
    /// the balance would overflow.
    pub async fn record_payment(
        &mut self,
        session: &SessionState,
        employee_id: &str,
        amount: i64,
    ) -> Result<Option<Employee>> {
        let Some(actor) = Self::gate(session, Scope::Shared, "balance.payment") else {
            return Ok(None);
        };
        if amount <= 0 {
            return Err(Error::InvalidAmount { amount });
        }

        let Some(updated) =
            balance::apply_credit(&mut self.state.employees, employee_id, amount)?.cloned()
        else {
            tracing::debug!(employee_id, "Payment for unknown employee ignored");
            return Ok(None);
        };

        self.log(
            actor,
            "balance.payment",
            &format!("{} paid {amount} -> {}", updated.name, updated.balance),
        );
        self.persist(&[Collection::Employees, Collection::Logs]).await;
        Ok(Some(updated))
    }

    // ---- lunches ----

    /// Replaces the lunch list of `date` and reconciles balances. Admin only.
    ///
    /// # Errors
    /// Returns a validation error for negative prices or duplicate employees;
    /// nothing is changed in that case.
    pub async fn save_lunch(
        &mut self,
        session: &SessionState,
        date: NaiveDate,
        items: Vec<LunchItem>,
    ) -> Result<Option<LunchUpdate>> {
        let Some(actor) = Self::gate(session, Scope::Shared, "lunch.update") else {
            return Ok(None);
        };

        let item_count = items.len();
        let update = balance::apply_lunch_update(&mut self.state, date, items)?;
        let details = if update.stored {
            format!("{date}: {item_count} meals")
        } else {
            format!("{date}: cleared")
        };
        self.log(actor, "lunch.update", &details);
        self.persist(&[
            Collection::LunchRecords,
            Collection::Employees,
            Collection::Logs,
        ])
        .await;
        Ok(Some(update))
    }

    // ---- settings ----

    /// Updates cost per meal and/or theme color. Admin only.
    ///
    /// # Errors
    /// Returns [`Error::InvalidAmount`] for a negative cost and
    /// [`Error::Validation`] for an unknown color.
    pub async fn update_settings(
        &mut self,
        session: &SessionState,
        update: SettingsUpdate,
    ) -> Result<Option<AppSettings>> {
        let Some(actor) = Self::gate(session, Scope::Shared, "settings.update") else {
            return Ok(None);
        };

        if let Some(cost) = update.cost_per_meal {
            if cost < 0 {
                return Err(Error::InvalidAmount { amount: cost });
            }
        }
        let theme_color = match update.theme_color {
            Some(color) => {
                let color = color.trim().to_lowercase();
                if !theme::is_known_color(&color) {
                    return Err(Error::Validation {
                        message: format!(
                            "unknown theme color '{color}', expected one of: {}",
                            theme::color_names().collect::<Vec<_>>().join(", ")
                        ),
                    });
                }
                Some(color)
            }
            None => None,
        };

        if let Some(cost) = update.cost_per_meal {
            self.state.settings.cost_per_meal = cost;
        }
        if let Some(color) = theme_color {
            self.state.settings.theme_color = color;
        }

        let settings = self.state.settings.clone();
        self.log(
            actor,
            "settings.update",
            &format!(
                "costPerMeal={} themeColor={}",
                settings.cost_per_meal, settings.theme_color
            ),
        );
        self.persist(&[Collection::Settings, Collection::Logs]).await;
        Ok(Some(settings))
    }

    // ---- fund expenses ----

    /// Records an expense owned by the caller. Any logged-in user.
    ///
    /// # Errors
    /// Returns a validation error for an empty title or negative amount.
    pub async fn add_expense(
        &mut self,
        session: &SessionState,
        input: NewExpense,
    ) -> Result<Option<ExpenseRecord>> {
        let Some(actor) = Self::gate(session, Scope::OwnNew, "expense.add") else {
            return Ok(None);
        };

        let record = expense::add_expense(&mut self.state, &actor.id, input)?;
        self.log(
            actor,
            "expense.add",
            &format!("{} {} on {}", record.title, record.amount, record.date),
        );
        self.persist(&[Collection::ExpenseRecords, Collection::Logs])
            .await;
        Ok(Some(record))
    }

    /// Deletes one of the caller's own expenses.
    ///
    /// # Errors
    /// Returns [`Error::RecordNotFound`] for an unknown id.
    pub async fn remove_expense(
        &mut self,
        session: &SessionState,
        expense_id: &str,
    ) -> Result<Option<ExpenseRecord>> {
        if session.user(Utc::now()).is_none() {
            tracing::warn!(action = "expense.remove", "Mutation denied");
            return Ok(None);
        }
        let owner_id = expense::find_expense(&self.state, expense_id)
            .map(|record| record.user_id.clone())
            .ok_or_else(|| Error::RecordNotFound {
                id: expense_id.to_string(),
            })?;
        let Some(actor) = Self::gate(
            session,
            Scope::Owned {
                owner_id: &owner_id,
            },
            "expense.remove",
        ) else {
            return Ok(None);
        };

        let removed = expense::remove_expense(&mut self.state, expense_id)?;
        self.log(
            actor,
            "expense.remove",
            &format!("{} {} on {}", removed.title, removed.amount, removed.date),
        );
        self.persist(&[Collection::ExpenseRecords, Collection::Logs])
            .await;
        Ok(Some(removed))
    }

    // ---- debt book ----

    fn debt_owner(&self, debt_id: &str) -> Result<String> {
        debt::find_debt(&self.state, debt_id)
            .map(|record| record.user_id.clone())
            .ok_or_else(|| Error::RecordNotFound {
                id: debt_id.to_string(),
            })
    }

    /// Adds a debt entry owned by the caller. Any logged-in user.
    ///
    /// # Errors
    /// Returns a validation error for an empty name or negative amounts.
    pub async fn add_debt(
        &mut self,
        session: &SessionState,
        input: NewDebt,
    ) -> Result<Option<DebtRecord>> {
        let Some(actor) = Self::gate(session, Scope::OwnNew, "debt.add") else {
            return Ok(None);
        };

        let record = debt::add_debt(&mut self.state, &actor.id, input)?;
        self.log(
            actor,
            "debt.add",
            &format!(
                "{} {} {}",
                record.kind.as_str(),
                record.person_name,
                record.amount
            ),
        );
        self.persist(&[Collection::DebtRecords, Collection::Logs])
            .await;
        Ok(Some(record))
    }

    /// Updates one of the caller's own debt entries.
    ///
    /// # Errors
    /// Returns [`Error::RecordNotFound`] for an unknown id or a validation
    /// error for bad values.
    pub async fn update_debt(
        &mut self,
        session: &SessionState,
        debt_id: &str,
        update: DebtUpdate,
    ) -> Result<Option<DebtRecord>> {
        if session.user(Utc::now()).is_none() {
            tracing::warn!(action = "debt.update", "Mutation denied");
            return Ok(None);
        }
        let owner_id = self.debt_owner(debt_id)?;
        let Some(actor) = Self::gate(
            session,
            Scope::Owned {
                owner_id: &owner_id,
            },
            "debt.update",
        ) else {
            return Ok(None);
        };

        let record = debt::update_debt(&mut self.state, debt_id, update)?;
        self.log(
            actor,
            "debt.update",
            &format!(
                "{} {}/{}",
                record.person_name, record.paid_amount, record.amount
            ),
        );
        self.persist(&[Collection::DebtRecords, Collection::Logs])
            .await;
        Ok(Some(record))
    }

    /// Adds a repayment to one of the caller's own debt entries.
    ///
    /// # Errors
    /// Returns [`Error::RecordNotFound`] for an unknown id and
    /// [`Error::InvalidAmount`] unless `amount` is positive.
    pub async fn record_debt_payment(
        &mut self,
        session: &SessionState,
        debt_id: &str,
        amount: i64,
    ) -> Result<Option<DebtRecord>> {
        if session.user(Utc::now()).is_none() {
            tracing::warn!(action = "debt.payment", "Mutation denied");
            return Ok(None);
        }
        let owner_id = self.debt_owner(debt_id)?;
        let Some(actor) = Self::gate(
            session,
            Scope::Owned {
                owner_id: &owner_id,
            },
            "debt.payment",
        ) else {
            return Ok(None);
        };

        let record = debt::record_repayment(&mut self.state, debt_id, amount)?;
        self.log(
            actor,
            "debt.payment",
            &format!(
                "{} +{amount} ({}/{})",
                record.person_name, record.paid_amount, record.amount
            ),
        );
        self.persist(&[Collection::DebtRecords, Collection::Logs])
            .await;
        Ok(Some(record))
    }

    /// Deletes one of the caller's own debt entries.
    ///
    /// # Errors
    /// Returns [`Error::RecordNotFound`] for an unknown id.
    pub async fn remove_debt(
        &mut self,
        session: &SessionState,
        debt_id: &str,
    ) -> Result<Option<DebtRecord>> {
        if session.user(Utc::now()).is_none() {
            tracing::warn!(action = "debt.remove", "Mutation denied");
            return Ok(None);
        }
        let owner_id = self.debt_owner(debt_id)?;
        let Some(actor) = Self::gate(
            session,
            Scope::Owned {
                owner_id: &owner_id,
            },
            "debt.remove",
        ) else {
            return Ok(None);
        };

        let removed = debt::remove_debt(&mut self.state, debt_id)?;
        self.log(
            actor,
            "debt.remove",
            &format!("{} {}", removed.person_name, removed.amount),
        );
        self.persist(&[Collection::DebtRecords, Collection::Logs])
            .await;
        Ok(Some(removed))
    }

    // ---- payment scanner ----

    /// Employees offered to the payment matcher. Admin only, since a match
    /// ends in a balance credit.
    #[must_use]
    pub fn payment_candidates(&self, session: &SessionState) -> Option<Vec<Candidate>> {
        Self::gate(session, Scope::Shared, "balance.scan")?;
        Some(self.state.employees.iter().map(Candidate::from).collect())
    }

    /// Credits the employee a matcher picked. Admin only.
    ///
    /// Returns `Ok(None)` when denied, when nothing was matched, or when the
    /// matched id is not a known employee.
    ///
    /// # Errors
    /// Returns [`Error::Matcher`] when the amount cannot be credited.
    pub async fn confirm_payment(
        &mut self,
        session: &SessionState,
        found: &PaymentMatch,
    ) -> Result<Option<ConfirmedPayment>> {
        let Some(employee_id) = found.matched_employee_id.as_deref() else {
            return Ok(None);
        };
        let amount = found.credit_amount().ok_or_else(|| Error::Matcher {
            message: format!("amount {} cannot be credited", found.amount),
        })?;

        Ok(self
            .record_payment(session, employee_id, amount)
            .await?
            .map(|employee| ConfirmedPayment { employee, amount }))
    }

    // ---- backup ----

    /// Snapshot of the whole state. Anyone may export, but the account list
    /// with its password hashes is only included for an admin.
    #[must_use]
    pub fn export(&self, session: &SessionState) -> Snapshot {
        let now = Utc::now();
        let mut snapshot = backup::export_snapshot(&self.state, now);
        if auth::authorize(session, Scope::Shared, now).is_none() {
            snapshot.users = None;
        }
        snapshot
    }

    /// Replaces every collection present in `snapshot`. Admin only, and only
    /// once the overwrite was confirmed.
    ///
    /// # Errors
    /// Never fails after parsing; kept fallible so callers treat it like other
    /// mutations.
    pub async fn import(
        &mut self,
        session: &SessionState,
        snapshot: Snapshot,
        confirmation: Confirmation,
    ) -> Result<Option<ImportOutcome>> {
        let Some(actor) = Self::gate(session, Scope::Shared, "data.import") else {
            return Ok(None);
        };

        let Some(outcome) = backup::apply_snapshot(&mut self.state, snapshot, confirmation) else {
            tracing::info!("Import declined, keeping current data");
            return Ok(None);
        };

        self.log(
            actor,
            "data.import",
            &format!("replaced {}", outcome.replaced.join(", ")),
        );
        self.persist(&Collection::ALL).await;
        Ok(Some(outcome))
    }

    /// Wipes everything back to defaults. Admin only, and only when confirmed.
    ///
    /// # Errors
    /// Kept fallible so callers treat it like other mutations.
    pub async fn reset(
        &mut self,
        session: &SessionState,
        confirmation: Confirmation,
    ) -> Result<bool> {
        let Some(actor) = Self::gate(session, Scope::Shared, "data.reset") else {
            return Ok(false);
        };
        if confirmation == Confirmation::Declined {
            return Ok(false);
        }

        backup::reset(
            &mut self.state,
            self.config.default_settings(),
            self.seed_admin.clone(),
        );
        self.log(actor, "data.reset", "all data reset to defaults");
        self.persist(&Collection::ALL).await;
        Ok(true)
    }
}
