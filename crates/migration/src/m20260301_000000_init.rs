//! Initial schema for Spendr.
//!
//! - `users`: identities resolved by the auth layer
//! - `wallets` / `wallet_members`: shared or personal ledgers and who may use them
//! - `linked_items`: provider connections, including the sync cursor
//! - `accounts`: provider accounts materialized per linked item
//! - `transactions`: synced provider transactions (amounts in integer cents)
//! - `categorizations`: transaction → wallet assignments
//!
//! The unique indexes here are what the engine relies on to detect duplicate
//! transactions and repeated categorizations.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    Password,
}

#[derive(Iden)]
enum Wallets {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum WalletMembers {
    Table,
    WalletId,
    UserId,
}

#[derive(Iden)]
enum LinkedItems {
    Table,
    Id,
    UserId,
    ItemId,
    AccessToken,
    InstitutionName,
    TransactionsCursor,
    CreatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    LinkedItemId,
    AccountId,
    Name,
    OfficialName,
    AccountType,
    Subtype,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    UserId,
    AccountId,
    TransactionId,
    ExternalAccountId,
    AmountMinor,
    Date,
    AuthorizedDate,
    Name,
    MerchantName,
    Pending,
    PaymentChannel,
    TransactionCode,
    IsoCurrencyCode,
    UnofficialCurrencyCode,
    Location,
    PaymentMeta,
    PersonalFinanceCategory,
    Counterparties,
    CreatedAt,
}

#[derive(Iden)]
enum Categorizations {
    Table,
    Id,
    TransactionId,
    WalletId,
    CategoryType,
    CategorizedByUserId,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Wallets and members
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Wallets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Wallets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Wallets::Name).string().not_null())
                    .col(ColumnDef::new(Wallets::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WalletMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(WalletMembers::WalletId).integer().not_null())
                    .col(ColumnDef::new(WalletMembers::UserId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(WalletMembers::WalletId)
                            .col(WalletMembers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-wallet_members-wallet_id")
                            .from(WalletMembers::Table, WalletMembers::WalletId)
                            .to(Wallets::Table, Wallets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-wallet_members-user_id")
                            .from(WalletMembers::Table, WalletMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Linked items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LinkedItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinkedItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LinkedItems::UserId).integer().not_null())
                    .col(ColumnDef::new(LinkedItems::ItemId).string().not_null())
                    .col(ColumnDef::new(LinkedItems::AccessToken).string().not_null())
                    .col(ColumnDef::new(LinkedItems::InstitutionName).string())
                    .col(ColumnDef::new(LinkedItems::TransactionsCursor).text())
                    .col(ColumnDef::new(LinkedItems::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-linked_items-user_id")
                            .from(LinkedItems::Table, LinkedItems::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-linked_items-item_id-unique")
                    .table(LinkedItems::Table)
                    .col(LinkedItems::ItemId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-linked_items-user_id")
                    .table(LinkedItems::Table)
                    .col(LinkedItems::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::LinkedItemId).integer().not_null())
                    .col(ColumnDef::new(Accounts::AccountId).string().not_null())
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(ColumnDef::new(Accounts::OfficialName).string())
                    .col(ColumnDef::new(Accounts::AccountType).string().not_null())
                    .col(ColumnDef::new(Accounts::Subtype).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-linked_item_id")
                            .from(Accounts::Table, Accounts::LinkedItemId)
                            .to(LinkedItems::Table, LinkedItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-linked_item_id-account_id-unique")
                    .table(Accounts::Table)
                    .col(Accounts::LinkedItemId)
                    .col(Accounts::AccountId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::UserId).integer().not_null())
                    .col(ColumnDef::new(Transactions::AccountId).integer().not_null())
                    .col(
                        ColumnDef::new(Transactions::TransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::ExternalAccountId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Date).date().not_null())
                    .col(ColumnDef::new(Transactions::AuthorizedDate).date())
                    .col(ColumnDef::new(Transactions::Name).string().not_null())
                    .col(ColumnDef::new(Transactions::MerchantName).string())
                    .col(
                        ColumnDef::new(Transactions::Pending)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Transactions::PaymentChannel)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::TransactionCode).string())
                    .col(ColumnDef::new(Transactions::IsoCurrencyCode).string())
                    .col(ColumnDef::new(Transactions::UnofficialCurrencyCode).string())
                    .col(ColumnDef::new(Transactions::Location).text())
                    .col(ColumnDef::new(Transactions::PaymentMeta).text())
                    .col(ColumnDef::new(Transactions::PersonalFinanceCategory).text())
                    .col(ColumnDef::new(Transactions::Counterparties).text())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-user_id")
                            .from(Transactions::Table, Transactions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-account_id")
                            .from(Transactions::Table, Transactions::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-transaction_id-unique")
                    .table(Transactions::Table)
                    .col(Transactions::TransactionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-user_id-date")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Categorizations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categorizations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categorizations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Categorizations::TransactionId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Categorizations::WalletId).integer().not_null())
                    .col(
                        ColumnDef::new(Categorizations::CategoryType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Categorizations::CategorizedByUserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Categorizations::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categorizations-transaction_id")
                            .from(Categorizations::Table, Categorizations::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categorizations-wallet_id")
                            .from(Categorizations::Table, Categorizations::WalletId)
                            .to(Wallets::Table, Wallets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categorizations-categorized_by_user_id")
                            .from(Categorizations::Table, Categorizations::CategorizedByUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categorizations-transaction_id-wallet_id-unique")
                    .table(Categorizations::Table)
                    .col(Categorizations::TransactionId)
                    .col(Categorizations::WalletId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // A transaction sits in at most one wallet at a time.
        manager
            .create_index(
                Index::create()
                    .name("idx-categorizations-transaction_id-unique")
                    .table(Categorizations::Table)
                    .col(Categorizations::TransactionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categorizations-wallet_id")
                    .table(Categorizations::Table)
                    .col(Categorizations::WalletId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Categorizations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LinkedItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WalletMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Wallets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
