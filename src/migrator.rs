use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users_table::Migration),
            Box::new(m20250101_000002_create_pharmacies_table::Migration),
            Box::new(m20250101_000003_create_patients_table::Migration),
            Box::new(m20250101_000004_create_inventory_items_table::Migration),
            Box::new(m20250101_000005_create_saved_medicines_table::Migration),
        ]
    }
}

mod m20250101_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Role).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Users {
        Table,
        Id,
        Email,
        PasswordHash,
        Role,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000002_create_pharmacies_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_pharmacies_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Pharmacies::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Pharmacies::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Pharmacies::Email).string().not_null())
                        .col(ColumnDef::new(Pharmacies::PharmacyName).string().not_null())
                        .col(ColumnDef::new(Pharmacies::LicenseId).string().not_null())
                        .col(ColumnDef::new(Pharmacies::LicenseDocumentUrl).string().null())
                        .col(ColumnDef::new(Pharmacies::OwnerName).string().not_null())
                        .col(ColumnDef::new(Pharmacies::Phone).string().not_null())
                        .col(ColumnDef::new(Pharmacies::Address).string().not_null())
                        .col(ColumnDef::new(Pharmacies::City).string().not_null())
                        .col(ColumnDef::new(Pharmacies::District).string().not_null())
                        .col(ColumnDef::new(Pharmacies::Latitude).double().null())
                        .col(ColumnDef::new(Pharmacies::Longitude).double().null())
                        .col(ColumnDef::new(Pharmacies::OpeningHours).string().null())
                        .col(ColumnDef::new(Pharmacies::Description).text().null())
                        .col(
                            ColumnDef::new(Pharmacies::Status)
                                .string_len(32)
                                .not_null()
                                .default("pending"),
                        )
                        .col(
                            ColumnDef::new(Pharmacies::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Pharmacies::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_pharmacies_user")
                                .from(Pharmacies::Table, Pharmacies::Id)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_pharmacies_status")
                        .table(Pharmacies::Table)
                        .col(Pharmacies::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Pharmacies::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    pub enum Pharmacies {
        Table,
        Id,
        Email,
        PharmacyName,
        LicenseId,
        LicenseDocumentUrl,
        OwnerName,
        Phone,
        Address,
        City,
        District,
        Latitude,
        Longitude,
        OpeningHours,
        Description,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000003_create_patients_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_patients_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Patients::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Patients::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Patients::Email).string().not_null())
                        .col(ColumnDef::new(Patients::FullName).string().not_null())
                        .col(ColumnDef::new(Patients::Phone).string().not_null().default(""))
                        .col(ColumnDef::new(Patients::City).string().not_null().default(""))
                        .col(
                            ColumnDef::new(Patients::District)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Patients::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Patients::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_patients_user")
                                .from(Patients::Table, Patients::Id)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Patients::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Patients {
        Table,
        Id,
        Email,
        FullName,
        Phone,
        City,
        District,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000004_create_inventory_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_inventory_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::PharmacyId).uuid().not_null())
                        .col(ColumnDef::new(InventoryItems::MedicineId).string().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::MedicineName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::Price)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::Stock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::LowStockThreshold)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::Available)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(InventoryItems::Category).string().null())
                        .col(ColumnDef::new(InventoryItems::Description).text().null())
                        .col(
                            ColumnDef::new(InventoryItems::LastUpdated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_items_pharmacy")
                                .from(InventoryItems::Table, InventoryItems::PharmacyId)
                                .to(Pharmacies::Table, Pharmacies::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_inventory_items_pharmacy")
                        .table(InventoryItems::Table)
                        .col(InventoryItems::PharmacyId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_inventory_items_name_available")
                        .table(InventoryItems::Table)
                        .col(InventoryItems::MedicineName)
                        .col(InventoryItems::Available)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Pharmacies {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum InventoryItems {
        Table,
        Id,
        PharmacyId,
        MedicineId,
        MedicineName,
        Price,
        Stock,
        LowStockThreshold,
        Available,
        Category,
        Description,
        LastUpdated,
    }
}

mod m20250101_000005_create_saved_medicines_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_saved_medicines_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SavedMedicines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SavedMedicines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SavedMedicines::PatientId).uuid().not_null())
                        .col(ColumnDef::new(SavedMedicines::InventoryItemId).uuid().null())
                        .col(
                            ColumnDef::new(SavedMedicines::MedicineName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SavedMedicines::PharmacyId).uuid().null())
                        .col(ColumnDef::new(SavedMedicines::PharmacyName).string().null())
                        .col(ColumnDef::new(SavedMedicines::Price).decimal_len(12, 2).null())
                        .col(
                            ColumnDef::new(SavedMedicines::SavedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_saved_medicines_patient")
                                .from(SavedMedicines::Table, SavedMedicines::PatientId)
                                .to(Patients::Table, Patients::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_saved_medicines_patient")
                        .table(SavedMedicines::Table)
                        .col(SavedMedicines::PatientId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SavedMedicines::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Patients {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum SavedMedicines {
        Table,
        Id,
        PatientId,
        InventoryItemId,
        MedicineName,
        PharmacyId,
        PharmacyName,
        Price,
        SavedAt,
    }
}
