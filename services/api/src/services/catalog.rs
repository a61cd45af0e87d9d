//! Reference data maintained by administrators

use chrono::Utc;
use common::store::{DEFAULTED, Filter, Order};
use csv::{ReaderBuilder, Trim};
use tracing::info;
use uuid::Uuid;

use super::fetch;
use crate::error::{ApiError, ApiResult};
use crate::models::catalog::{
    HealthService, HealthServiceRequest, ImportSummary, Map, MapRequest, Medical, MedicalRequest,
};
use crate::repositories::Repositories;
use crate::validation::require;

#[derive(Clone)]
pub struct MapService {
    repos: Repositories,
}

fn check_map(req: &MapRequest) -> ApiResult<()> {
    require("Name", &req.name).map_err(ApiError::BadRequest)?;
    if !(-90.0..=90.0).contains(&req.latitude) || !(-180.0..=180.0).contains(&req.longitude) {
        return Err(ApiError::bad_request("Coordinates are out of range"));
    }
    Ok(())
}

impl MapService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn list(&self) -> ApiResult<Vec<Map>> {
        Ok(self
            .repos
            .maps
            .find(Filter::new().order_by("name", Order::Asc))
            .await?)
    }

    pub async fn create(&self, req: MapRequest) -> ApiResult<Map> {
        check_map(&req)?;

        let map = Map {
            id: 0,
            uuid: Uuid::nil(),
            name: req.name.trim().to_string(),
            address: req.address,
            kind: req.kind,
            latitude: req.latitude,
            longitude: req.longitude,
            created_at: Utc::now(),
        };
        Ok(self.repos.maps.create_with_omit(DEFAULTED, map).await?)
    }

    pub async fn update(&self, uuid: Uuid, req: MapRequest) -> ApiResult<Map> {
        check_map(&req)?;

        let mut map = fetch(&self.repos.maps, uuid, "Map").await?;
        map.name = req.name.trim().to_string();
        map.address = req.address;
        map.kind = req.kind;
        map.latitude = req.latitude;
        map.longitude = req.longitude;

        Ok(self.repos.maps.update(&map).await?)
    }

    pub async fn delete(&self, uuid: Uuid) -> ApiResult<()> {
        let map = fetch(&self.repos.maps, uuid, "Map").await?;
        self.repos.maps.delete(&map).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct HealthServiceService {
    repos: Repositories,
}

impl HealthServiceService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn list(&self) -> ApiResult<Vec<HealthService>> {
        Ok(self
            .repos
            .health_services
            .find(Filter::new().order_by("name", Order::Asc))
            .await?)
    }

    pub async fn create(&self, req: HealthServiceRequest) -> ApiResult<HealthService> {
        require("Name", &req.name).map_err(ApiError::BadRequest)?;

        let service = HealthService {
            id: 0,
            uuid: Uuid::nil(),
            name: req.name.trim().to_string(),
            description: req.description,
            phone: req.phone,
            address: req.address,
            city: req.city,
            created_at: Utc::now(),
        };
        Ok(self
            .repos
            .health_services
            .create_with_omit(DEFAULTED, service)
            .await?)
    }

    pub async fn update(&self, uuid: Uuid, req: HealthServiceRequest) -> ApiResult<HealthService> {
        require("Name", &req.name).map_err(ApiError::BadRequest)?;

        let mut service = fetch(&self.repos.health_services, uuid, "Health service").await?;
        service.name = req.name.trim().to_string();
        service.description = req.description;
        service.phone = req.phone;
        service.address = req.address;
        service.city = req.city;

        Ok(self.repos.health_services.update(&service).await?)
    }

    pub async fn delete(&self, uuid: Uuid) -> ApiResult<()> {
        let service = fetch(&self.repos.health_services, uuid, "Health service").await?;
        self.repos.health_services.delete(&service).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct MedicalService {
    repos: Repositories,
}

impl MedicalService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn list(&self) -> ApiResult<Vec<Medical>> {
        Ok(self
            .repos
            .medicals
            .find(Filter::new().order_by("last_name", Order::Asc))
            .await?)
    }

    pub async fn create(&self, req: MedicalRequest) -> ApiResult<Medical> {
        require("First name", &req.first_name).map_err(ApiError::BadRequest)?;
        require("Last name", &req.last_name).map_err(ApiError::BadRequest)?;

        let medical = Medical::new(
            req.first_name.trim(),
            req.last_name.trim(),
            req.cjppu_number.trim(),
            req.profession_number.trim(),
        );
        Ok(self.repos.medicals.create_with_omit(DEFAULTED, medical).await?)
    }

    pub async fn delete(&self, uuid: Uuid) -> ApiResult<()> {
        let medical = fetch(&self.repos.medicals, uuid, "Medical").await?;
        self.repos.medicals.delete(&medical).await?;
        Ok(())
    }

    /// Insert every row of a registry export in one transaction
    pub async fn import(&self, bytes: &[u8]) -> ApiResult<ImportSummary> {
        let medicals = parse_registry(bytes)?;
        if medicals.is_empty() {
            return Err(ApiError::bad_request("The file has no rows to import"));
        }

        let created = self.repos.medicals.create_many(DEFAULTED, medicals).await?;
        info!("Imported {} medicals", created.len());

        Ok(ImportSummary {
            imported: created.len(),
        })
    }
}

/// Parse a Latin-1, semicolon-separated registry export.
///
/// Columns: first name, unused, last name, unused, CJPPU number,
/// profession number. The header row is skipped.
fn parse_registry(bytes: &[u8]) -> ApiResult<Vec<Medical>> {
    // every Latin-1 byte is the code point of the same value
    let text: String = bytes.iter().map(|&b| b as char).collect();

    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut medicals = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let line = index + 2;
        let malformed = || ApiError::BadRequest(format!("Malformed row at line {}", line));

        let record = record.map_err(|_| malformed())?;
        if record.len() < 6 {
            return Err(malformed());
        }

        let first_name = &record[0];
        let last_name = &record[2];
        if first_name.is_empty() || last_name.is_empty() {
            return Err(malformed());
        }

        medicals.push(Medical::new(first_name, last_name, &record[4], &record[5]));
    }

    Ok(medicals)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = "Nome;Sexo;Sobrenome;UF;CJPPU;Registro\n\
                            Joana ; F ; Lima ; PE ; 111 ; CRM-1\n\
                            Caio;M;Araújo;SP;222;CRM-2\n";

    fn latin1(text: &str) -> Vec<u8> {
        text.chars().map(|c| c as u32 as u8).collect()
    }

    #[tokio::test]
    async fn import_trims_every_field() {
        let repos = Repositories::in_memory();
        let service = MedicalService::new(repos.clone());

        let summary = service.import(&latin1(REGISTRY)).await.unwrap();
        assert_eq!(summary.imported, 2);

        let medicals = service.list().await.unwrap();
        assert_eq!(medicals.len(), 2);
        assert_eq!(medicals[0].first_name, "Caio");
        assert_eq!(medicals[0].last_name, "Araújo");
        assert_eq!(medicals[1].first_name, "Joana");
        assert_eq!(medicals[1].cjppu_number, "111");
        assert_eq!(medicals[1].profession_number, "CRM-1");
    }

    #[tokio::test]
    async fn malformed_row_aborts_the_import() {
        let repos = Repositories::in_memory();
        let service = MedicalService::new(repos.clone());
        let file = "Nome;Sexo;Sobrenome;UF;CJPPU;Registro\nJoana;F;Lima;PE;111;CRM-1\nCaio;M\n";

        let err = service.import(file.as_bytes()).await.unwrap_err();
        assert_eq!(err.to_string(), "Malformed row at line 3");
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn header_only_file_is_rejected() {
        let service = MedicalService::new(Repositories::in_memory());
        let err = service
            .import(b"Nome;Sexo;Sobrenome;UF;CJPPU;Registro\n")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn map_coordinates_are_checked() {
        let service = MapService::new(Repositories::in_memory());
        let req = MapRequest {
            name: "Clinic".to_string(),
            address: String::new(),
            kind: "clinic".to_string(),
            latitude: 123.0,
            longitude: 0.0,
        };
        assert!(matches!(service.create(req).await.unwrap_err(), ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn health_services_update_in_place() {
        let service = HealthServiceService::new(Repositories::in_memory());
        let request = |name: &str| HealthServiceRequest {
            name: name.to_string(),
            description: String::new(),
            phone: "81 5555".to_string(),
            address: String::new(),
            city: "Recife".to_string(),
        };

        let created = service.create(request("UBS Centro")).await.unwrap();
        let updated = service.update(created.uuid, request("UBS Boa Vista")).await.unwrap();

        assert_eq!(updated.uuid, created.uuid);
        assert_eq!(service.list().await.unwrap()[0].name, "UBS Boa Vista");
    }
}
