use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ── Create tokens table ──
        manager
            .create_table(
                Table::create()
                    .table(Tokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tokens::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tokens::AccountId).integer().not_null())
                    .col(
                        ColumnDef::new(Tokens::SecretHash)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Tokens::SecretPrefix).string().not_null())
                    .col(ColumnDef::new(Tokens::Kind).string().not_null())
                    .col(ColumnDef::new(Tokens::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Tokens::ExpiresAt).timestamp().not_null())
                    .col(ColumnDef::new(Tokens::UsedAt).timestamp().null())
                    .col(ColumnDef::new(Tokens::UsedFrom).string().null())
                    .col(ColumnDef::new(Tokens::ExternalIdentity).string().null())
                    .col(ColumnDef::new(Tokens::Status).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tokens_account_kind_status")
                    .table(Tokens::Table)
                    .col(Tokens::AccountId)
                    .col(Tokens::Kind)
                    .col(Tokens::Status)
                    .to_owned(),
            )
            .await?;

        // At most one active token per (account, kind). The issuance
        // transaction maintains this; the partial index makes the database
        // reject a second active row if two issuances ever commit
        // concurrently. Same syntax on SQLite and PostgreSQL.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX idx_tokens_one_active ON tokens (account_id, kind) \
                 WHERE status = 'active'",
            )
            .await?;

        // ── Create sessions table ──
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sessions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sessions::AccountId).integer().not_null())
                    .col(
                        ColumnDef::new(Sessions::ExternalIdentity)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Sessions::OriginAddress).string().null())
                    .col(ColumnDef::new(Sessions::OriginPort).integer().null())
                    .col(ColumnDef::new(Sessions::LoginTime).timestamp().not_null())
                    .col(ColumnDef::new(Sessions::LastSeen).timestamp().not_null())
                    .col(ColumnDef::new(Sessions::LogoutTime).timestamp().null())
                    .col(ColumnDef::new(Sessions::Status).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sessions_account_status")
                    .table(Sessions::Table)
                    .col(Sessions::AccountId)
                    .col(Sessions::Status)
                    .to_owned(),
            )
            .await?;

        // ── Create identities table ──
        manager
            .create_table(
                Table::create()
                    .table(Identities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Identities::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Identities::AccountId).integer().not_null())
                    .col(
                        ColumnDef::new(Identities::ExternalIdentity)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Identities::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Identities::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Identities::LastSeen).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ── Create audit_log table ──
        manager
            .create_table(
                Table::create()
                    .table(AuditLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditLog::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditLog::AccountId).integer().not_null())
                    .col(ColumnDef::new(AuditLog::TokenPrefix).string().not_null())
                    .col(ColumnDef::new(AuditLog::Action).string().not_null())
                    .col(ColumnDef::new(AuditLog::IpAddress).string().null())
                    .col(ColumnDef::new(AuditLog::ExternalIdentity).string().null())
                    .col(ColumnDef::new(AuditLog::LogTime).timestamp().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Identities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tokens::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Tokens {
    Table,
    Id,
    AccountId,
    SecretHash,
    SecretPrefix,
    Kind,
    CreatedAt,
    ExpiresAt,
    UsedAt,
    UsedFrom,
    ExternalIdentity,
    Status,
}

#[derive(Iden)]
enum Sessions {
    Table,
    Id,
    AccountId,
    ExternalIdentity,
    OriginAddress,
    OriginPort,
    LoginTime,
    LastSeen,
    LogoutTime,
    Status,
}

#[derive(Iden)]
enum Identities {
    Table,
    Id,
    AccountId,
    ExternalIdentity,
    Verified,
    CreatedAt,
    LastSeen,
}

#[derive(Iden)]
enum AuditLog {
    Table,
    Id,
    AccountId,
    TokenPrefix,
    Action,
    IpAddress,
    ExternalIdentity,
    LogTime,
}
