use classaccess_core::AppError;
use classaccess_db::Store;
use classaccess_models::devices::Device;
use tracing::{info, instrument};

pub struct DeviceService;

impl DeviceService {
    #[instrument(skip(store))]
    pub async fn list(store: &dyn Store) -> Result<Vec<Device>, AppError> {
        store.list_devices().await
    }

    /// New devices start active.
    #[instrument(skip(store))]
    pub async fn create(store: &dyn Store, name: &str) -> Result<Device, AppError> {
        let device = store.create_device(name).await?;
        info!(id_dispositivo = device.id_dispositivo, "Device registered");
        Ok(device)
    }

    #[instrument(skip(store))]
    pub async fn set_status(
        store: &dyn Store,
        device_id: i32,
        active: bool,
    ) -> Result<Device, AppError> {
        let device = store
            .set_device_status(device_id, active)
            .await?
            .ok_or_else(|| AppError::not_found("Dispositivo no encontrado"))?;

        info!(device_id, active, "Device status changed");
        Ok(device)
    }
}
