use classaccess_core::AppError;
use classaccess_db::Store;
use classaccess_models::classrooms::{Classroom, ClassroomDto};
use tracing::{info, instrument};

pub struct ClassroomService;

impl ClassroomService {
    #[instrument(skip(store))]
    pub async fn list(store: &dyn Store) -> Result<Vec<Classroom>, AppError> {
        store.list_classrooms().await
    }

    /// A (name, building) pair may exist only once; duplicates are 409.
    #[instrument(skip(store))]
    pub async fn create(store: &dyn Store, dto: ClassroomDto) -> Result<Classroom, AppError> {
        let classroom = store.create_classroom(dto).await?;
        info!(id_aula = classroom.id_aula, "Classroom created");
        Ok(classroom)
    }

    #[instrument(skip(store))]
    pub async fn update(
        store: &dyn Store,
        room_id: i32,
        dto: ClassroomDto,
    ) -> Result<Classroom, AppError> {
        let classroom = store
            .update_classroom(room_id, dto)
            .await?
            .ok_or_else(|| AppError::not_found("Aula no encontrada"))?;
        info!(room_id, "Classroom updated");
        Ok(classroom)
    }
}
