use contracts::domain::a001_table_metadata::{MetadataEntry, MetadataKey};
use contracts::enums::ElementDataType;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Select, Set, TransactionTrait};

/// Строка таблицы `_key_value_store_active`
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "_key_value_store_active")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "_table_id")]
    pub table_id: String,
    #[sea_orm(column_name = "_partition")]
    pub partition: String,
    #[sea_orm(column_name = "_aspect")]
    pub aspect: String,
    #[sea_orm(column_name = "_key")]
    pub key: String,
    #[sea_orm(column_name = "_type")]
    pub value_type: String,
    #[sea_orm(column_name = "_value")]
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn metadata_key(&self) -> MetadataKey {
        MetadataKey::new(
            self.table_id.clone(),
            self.partition.clone(),
            self.aspect.clone(),
            self.key.clone(),
        )
    }

    /// Преобразование в запись; `None`, если тег типа не распознан
    pub fn to_entry(&self) -> Option<MetadataEntry> {
        let element_type = ElementDataType::from_code(&self.value_type)?;
        Some(MetadataEntry::new(
            self.metadata_key(),
            element_type,
            self.value.clone(),
        ))
    }
}

fn by_key(key: &MetadataKey) -> Select<Entity> {
    Entity::find()
        .filter(Column::TableId.eq(key.table_id.as_str()))
        .filter(Column::Partition.eq(key.partition.as_str()))
        .filter(Column::Aspect.eq(key.aspect.as_str()))
        .filter(Column::Key.eq(key.key.as_str()))
}

/// Все строки с этим ключом (в норме ноль или одна)
pub async fn find_by_key<C: ConnectionTrait>(
    conn: &C,
    key: &MetadataKey,
) -> Result<Vec<Model>, DbErr> {
    by_key(key).all(conn).await
}

/// Все записи таблицы
pub async fn list_for_table<C: ConnectionTrait>(
    conn: &C,
    table_id: &str,
) -> Result<Vec<Model>, DbErr> {
    Entity::find()
        .filter(Column::TableId.eq(table_id))
        .all(conn)
        .await
}

/// Заменить запись: удалить все строки с ключом и вставить одну
///
/// Выполняется в одной транзакции. Конкурентные писатели одного ключа
/// проходят по принципу last-write-wins, без блокировок и проверки версий.
pub async fn replace<C: ConnectionTrait + TransactionTrait>(
    conn: &C,
    entry: &MetadataEntry,
) -> Result<(), DbErr> {
    let txn = conn.begin().await?;
    delete_rows(&txn, &entry.key).await?;
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        table_id: Set(entry.key.table_id.clone()),
        partition: Set(entry.key.partition.clone()),
        aspect: Set(entry.key.aspect.clone()),
        key: Set(entry.key.key.clone()),
        value_type: Set(entry.element_type.code().to_string()),
        value: Set(entry.value.clone()),
    };
    Entity::insert(active).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}

/// Удалить все строки с ключом; возвращает число удалённых
pub async fn delete<C: ConnectionTrait>(conn: &C, key: &MetadataKey) -> Result<u64, DbErr> {
    delete_rows(conn, key).await
}

async fn delete_rows<C: ConnectionTrait>(conn: &C, key: &MetadataKey) -> Result<u64, DbErr> {
    let result = Entity::delete_many()
        .filter(Column::TableId.eq(key.table_id.as_str()))
        .filter(Column::Partition.eq(key.partition.as_str()))
        .filter(Column::Aspect.eq(key.aspect.as_str()))
        .filter(Column::Key.eq(key.key.as_str()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
