use crate::config::MqttConf;
use crate::events::{extract_event_name, EventError, PushEvent};
use crate::shell::ShellEvent;
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, warn};

/// Canal temps réel : chaque publication sur `conf.topic` devient un
/// `ShellEvent::Push`. Reconnexion automatique par rumqttc.
pub fn spawn_mqtt_listener(conf: MqttConf, tx: UnboundedSender<ShellEvent>) -> JoinHandle<()> {
    task::spawn(async move {
        let mut opts = MqttOptions::new(conf.client_id.clone(), conf.host.clone(), conf.port);
        opts.set_keep_alive(Duration::from_secs(15));
        let (client, mut eventloop) = AsyncClient::new(opts, 10);
        let mut connected = false;

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                    // les abonnements ne survivent pas à une session propre
                    if let Err(e) = client.try_subscribe(conf.topic.clone(), QoS::AtLeastOnce) {
                        error!("abonnement MQTT {} échoué: {e:?}", conf.topic);
                    }
                    connected = true;
                    if tx.send(ShellEvent::Push(PushEvent::Connected)).is_err() {
                        return;
                    }
                }
                Ok(Event::Incoming(Incoming::Publish(p))) => {
                    let name = extract_event_name(&p.topic);
                    match PushEvent::decode(name, &p.payload) {
                        Ok(event) => {
                            if tx.send(ShellEvent::Push(event)).is_err() {
                                return;
                            }
                        }
                        Err(EventError::Unknown(name)) => debug!("événement {name} ignoré"),
                        Err(e) => warn!("{e}"),
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!("MQTT erreur: {e:?}");
                    if connected {
                        connected = false;
                        if tx.send(ShellEvent::Push(PushEvent::Disconnected)).is_err() {
                            return;
                        }
                    }
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    })
}
