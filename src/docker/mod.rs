//! Docker container management for disposable PostgreSQL instances.
//!
//! The headless differ never touches a user database: it starts a scratch
//! container from the requested image, builds the master and branch states in
//! separate databases inside it, and removes the container when done.

use anyhow::{Result, anyhow};
use bollard::Docker;
use bollard::models::{ContainerCreateBody, ContainerStateStatusEnum};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, InspectContainerOptions, RemoveContainerOptions,
    StartContainerOptions, StopContainerOptions,
};
use bollard::secret::{ContainerInspectResponse, HostConfig, PortBinding};
use futures_util::StreamExt;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const SCRATCH_PASSWORD: &str = "pgdelta_scratch_password";

/// Connection details for a running scratch PostgreSQL container.
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl ContainerInfo {
    /// Connection string for a specific database inside the container.
    pub fn connection_string(&self, database: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode=disable",
            self.username, self.password, self.host, self.port, database
        )
    }
}

/// RAII wrapper for a scratch database container; removes it on drop.
pub struct ScratchPostgres {
    pub info: ContainerInfo,
}

impl Drop for ScratchPostgres {
    fn drop(&mut self) {
        let container_id = self.info.id.clone();
        unregister_container(&container_id);

        // Block on cleanup in a fresh runtime so Drop works both inside and
        // outside an async context.
        let cleanup = std::thread::spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    debug!("Failed to create runtime for cleanup: {}", e);
                    return;
                }
            };
            rt.block_on(async {
                match DockerManager::new().await {
                    Ok(manager) => {
                        if let Err(e) = manager.remove_container(&container_id, true).await {
                            let message = e.to_string();
                            if !message.contains("404") && !message.contains("No such container") {
                                debug!("Failed to remove scratch container: {}", e);
                            }
                        }
                    }
                    Err(e) => debug!("Failed to reconnect to Docker for cleanup: {}", e),
                }
            });
        });
        let _ = cleanup.join();
    }
}

/// Thin wrapper over the bollard client.
pub struct DockerManager {
    docker: Docker,
}

impl DockerManager {
    pub async fn new() -> Result<Self> {
        const MAX_RETRIES: u32 = 5;
        const RETRY_DELAY_MS: u64 = 200;

        for attempt in 0..=MAX_RETRIES {
            match Self::try_connect().await {
                Ok(manager) => return Ok(manager),
                Err(_) if attempt < MAX_RETRIES => {
                    sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
                }
                Err(e) => {
                    return Err(anyhow!(
                        "Failed to connect to Docker after {} attempts: {}\nMake sure a Docker daemon is running (DOCKER_HOST is honored).",
                        MAX_RETRIES + 1,
                        e
                    ));
                }
            }
        }
        unreachable!()
    }

    pub async fn is_available() -> bool {
        Self::try_connect().await.is_ok()
    }

    async fn try_connect() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| anyhow!("Failed to connect to Docker daemon: {}", e))?;
        docker
            .ping()
            .await
            .map_err(|e| anyhow!("Docker daemon not responding: {}", e))?;
        Ok(Self { docker })
    }

    /// Start a scratch PostgreSQL container from `image` and wait until it
    /// accepts connections.
    pub async fn start_scratch_postgres(&self, image: &str) -> Result<ScratchPostgres> {
        let container_name = format!("pgdelta_scratch_{}", uuid::Uuid::new_v4().simple());
        debug!("Starting scratch PostgreSQL container: {}", container_name);

        self.ensure_image_available(image).await?;

        let env_vars = vec![
            format!("POSTGRES_PASSWORD={}", SCRATCH_PASSWORD),
            "POSTGRES_USER=postgres".to_string(),
        ];

        // Let Docker pick a free host port on loopback.
        let mut port_bindings = HashMap::new();
        port_bindings.insert(
            "5432/tcp".to_string(),
            Some(vec![PortBinding {
                host_ip: Some("127.0.0.1".to_string()),
                host_port: None,
            }]),
        );

        let container_config = ContainerCreateBody {
            image: Some(image.to_string()),
            env: Some(env_vars),
            host_config: Some(HostConfig {
                port_bindings: Some(port_bindings),
                ..Default::default()
            }),
            ..Default::default()
        };

        let create_options = CreateContainerOptions {
            name: Some(container_name.clone()),
            ..Default::default()
        };

        let container = self
            .docker
            .create_container(Some(create_options), container_config)
            .await
            .map_err(|e| anyhow!("Failed to create container: {}", e))?;

        if let Err(e) = self
            .docker
            .start_container(&container.id, None::<StartContainerOptions>)
            .await
        {
            let _ = self.remove_container(&container.id, true).await;
            return Err(anyhow!("Failed to start container: {}", e));
        }

        register_container(container.id.clone());

        let inspect = self
            .docker
            .inspect_container(&container.id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| anyhow!("Failed to inspect container: {}", e))?;

        let info = ContainerInfo {
            id: container.id.clone(),
            host: "127.0.0.1".to_string(),
            port: extract_host_port(&inspect)?,
            username: "postgres".to_string(),
            password: SCRATCH_PASSWORD.to_string(),
        };

        if let Err(e) = self.wait_for_postgres_ready(&info).await {
            let _ = self.remove_container(&container.id, true).await;
            unregister_container(&container.id);
            return Err(e);
        }

        info!("Scratch PostgreSQL ready on port {}", info.port);
        Ok(ScratchPostgres { info })
    }

    /// Remove a container, force-removing if it is still running.
    pub async fn remove_container(&self, container_id: &str, force: bool) -> Result<()> {
        if !force {
            let _ = self
                .docker
                .stop_container(container_id, None::<StopContainerOptions>)
                .await;
        }

        self.docker
            .remove_container(
                container_id,
                Some(RemoveContainerOptions {
                    force,
                    ..Default::default()
                }),
            )
            .await
            .map_err(|e| anyhow!("Failed to remove container: {}", e))?;
        unregister_container(container_id);
        Ok(())
    }

    async fn ensure_image_available(&self, image: &str) -> Result<()> {
        if self.docker.inspect_image(image).await.is_ok() {
            return Ok(());
        }
        info!("Pulling image {}...", image);

        let options = CreateImageOptions {
            from_image: Some(image.to_string()),
            ..Default::default()
        };
        let mut pull_stream = self.docker.create_image(Some(options), None, None);
        while let Some(result) = pull_stream.next().await {
            result.map_err(|e| anyhow!("Failed to pull image {}: {}", image, e))?;
        }
        debug!("Image {} available", image);
        Ok(())
    }

    async fn wait_for_postgres_ready(&self, info: &ContainerInfo) -> Result<()> {
        const MAX_ATTEMPTS: u32 = 30;
        const RETRY_DELAY_MS: u64 = 1000;
        const INITIAL_DELAY_MS: u64 = 500;

        sleep(Duration::from_millis(INITIAL_DELAY_MS)).await;

        let mut last_error = None;
        for attempt in 1..=MAX_ATTEMPTS {
            // Fail fast if the container died instead of waiting out the clock.
            let inspect = self
                .docker
                .inspect_container(&info.id, None::<InspectContainerOptions>)
                .await
                .map_err(|e| anyhow!("Failed to inspect container: {}", e))?;
            if let Some(state) = &inspect.state
                && matches!(
                    state.status,
                    Some(ContainerStateStatusEnum::EXITED) | Some(ContainerStateStatusEnum::DEAD)
                )
            {
                return Err(anyhow!(
                    "Scratch container exited with code {} during startup",
                    state.exit_code.unwrap_or(-1)
                ));
            }

            match try_connection(info).await {
                Ok(()) => {
                    debug!("PostgreSQL ready after {} attempt(s)", attempt);
                    return Ok(());
                }
                Err(e) => {
                    last_error = Some(e);
                    if attempt < MAX_ATTEMPTS {
                        sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
                    }
                }
            }
        }

        Err(anyhow!(
            "PostgreSQL failed to become ready after {} attempts. Last error: {}",
            MAX_ATTEMPTS,
            last_error.unwrap()
        ))
    }
}

async fn try_connection(info: &ContainerInfo) -> Result<()> {
    use sqlx::postgres::PgPoolOptions;

    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(5))
        .connect(&info.connection_string("postgres"))
        .await
        .map_err(|e| anyhow!("Failed to connect to PostgreSQL: {}", e))?;

    sqlx::query("SELECT 1")
        .fetch_one(&pool)
        .await
        .map_err(|e| anyhow!("Readiness query failed: {}", e))?;

    pool.close().await;
    Ok(())
}

fn extract_host_port(inspect: &ContainerInspectResponse) -> Result<u16> {
    let port_binding = inspect
        .network_settings
        .as_ref()
        .and_then(|settings| settings.ports.as_ref())
        .and_then(|ports| ports.get("5432/tcp"))
        .and_then(|bindings| bindings.as_ref())
        .and_then(|bindings| bindings.first())
        .ok_or_else(|| anyhow!("Container has no 5432/tcp port mapping"))?;

    let host_port = port_binding
        .host_port
        .as_ref()
        .ok_or_else(|| anyhow!("Host port not set for 5432/tcp"))?;
    host_port
        .parse::<u16>()
        .map_err(|e| anyhow!("Invalid host port '{}': {}", host_port, e))
}

/// Registry of live scratch containers, a backstop for cleanup when Drop
/// never runs (e.g. the process is interrupted).
static CONTAINER_REGISTRY: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn register_container(container_id: String) {
    CONTAINER_REGISTRY.lock().unwrap().push(container_id);
}

pub fn unregister_container(container_id: &str) {
    CONTAINER_REGISTRY
        .lock()
        .unwrap()
        .retain(|id| id != container_id);
}

/// Remove every registered container; called on ctrl-c.
pub async fn cleanup_all_containers() {
    let ids: Vec<String> = {
        let mut registry = CONTAINER_REGISTRY.lock().unwrap();
        std::mem::take(&mut *registry)
    };
    if ids.is_empty() {
        return;
    }

    info!("Cleaning up {} scratch container(s)", ids.len());
    for id in ids {
        match DockerManager::new().await {
            Ok(manager) => {
                if let Err(e) = manager.remove_container(&id, true).await {
                    let message = e.to_string();
                    if !message.contains("404") && !message.contains("No such container") {
                        warn!("Failed to clean up container {}: {}", id, e);
                    }
                }
            }
            Err(e) => warn!("Failed to reach Docker for cleanup of {}: {}", id, e),
        }
    }
}
