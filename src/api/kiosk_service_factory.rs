use crate::api::error::Result;
use crate::api::{
    ChannelBankFactory, DispenseScheduler, KioskConfig, KioskService, PointsLedger, PumpRegistryFactory,
    ResourceServiceFactory
};

pub struct KioskServiceFactory {}

impl KioskServiceFactory {
    pub fn create(config: &KioskConfig) -> Result<KioskService> {
        let resource_service = ResourceServiceFactory::create(config)?;
        let registry = PumpRegistryFactory::create(config, &resource_service)?;
        let ledger = PointsLedger::load(resource_service.clone(), config.ledger_file_path.clone().into_boxed_path())?;
        let channel_bank = ChannelBankFactory::create(config, &resource_service)?;
        let scheduler = DispenseScheduler::new(resource_service.clone(), channel_bank);
        Ok(KioskService::new(resource_service, registry, ledger, scheduler, config.ms_per_cl))
    }
}
