///! Network interface statistics for hosts and VMs

use std::sync::Arc;

use ovirt_common::{HostNics, Nic, VmNics};
use serde::de::DeserializeOwned;
use tracing::{error, info_span, Instrument};

use super::fanout::Recorder;
use super::{statistic, CollectorContext};
use crate::metric::Labels;

/// Statistics of every NIC of host `id` under `{prefix}network_`
pub async fn collect_for_host(ctx: &Arc<CollectorContext>, recorder: &Recorder, id: &str, prefix: &str, labels: &Labels) {
    collect::<HostNics>(ctx, recorder, format!("hosts/{}/nics", id), prefix, labels).await
}

/// Statistics of every NIC of VM `id` under `{prefix}network_`
pub async fn collect_for_vm(ctx: &Arc<CollectorContext>, recorder: &Recorder, id: &str, prefix: &str, labels: &Labels) {
    collect::<VmNics>(ctx, recorder, format!("vms/{}/nics", id), prefix, labels).await
}

async fn collect<L>(ctx: &Arc<CollectorContext>, recorder: &Recorder, nics_path: String, prefix: &str, labels: &Labels)
where
    L: DeserializeOwned + Into<Vec<Nic>>,
{
    let nics: Vec<Nic> = match ctx.fetch::<L>(&nics_path).await {
        Ok(list) => list.into(),
        Err(e) => {
            error!(path = %nics_path, error = %e, "Failed to fetch network interfaces");
            return;
        }
    };

    let prefix = format!("{}network_", prefix);
    recorder
        .fan_out(nics, |nic, recorder| {
            let ctx = Arc::clone(ctx);
            let path = format!("{}/{}/statistics", nics_path, nic.id);
            let prefix = prefix.clone();
            let labels = labels.with("nic", nic.name).with("mac", nic.mac.address);
            let span = info_span!("NetworkCollector.CollectForNic", path = %path);

            async move {
                statistic::collect(&ctx, &recorder, &path, &prefix, &labels).await;
            }
            .instrument(span)
        })
        .await;
}
