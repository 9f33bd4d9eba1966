//! AMQP 主题交换机通道（lapin）
//!
//! 连接建立时依次声明：持久化的 topic 交换机、持久化队列，以及以
//! 通配模式（默认 `task.*`）把队列绑定到交换机。通道开启发布确认，
//! 每条消息以 `application/json`、持久化投递模式发送并等待 broker 确认。
//!
use crate::error::{DomainError, DomainResult as Result};
use crate::eventing::{ExchangeChannel, TopicExchangeOptions};
use async_trait::async_trait;
use lapin::options::{
    BasicPublishOptions, ConfirmSelectOptions, ExchangeDeclareOptions, QueueBindOptions,
    QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use tracing::info;

const CONTENT_TYPE_JSON: &str = "application/json";
const DELIVERY_MODE_PERSISTENT: u8 = 2;
const REPLY_SUCCESS: u16 = 200;

pub struct AmqpChannel {
    connection: Connection,
    channel: Channel,
    exchange: String,
}

impl AmqpChannel {
    pub async fn connect(options: &TopicExchangeOptions) -> Result<Self> {
        let connection = Connection::connect(&options.url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await?;

        channel
            .exchange_declare(
                &options.exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        channel
            .queue_declare(
                &options.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        channel
            .queue_bind(
                &options.queue,
                &options.exchange,
                &options.binding_pattern,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await?;

        info!(
            exchange = %options.exchange,
            queue = %options.queue,
            binding = %options.binding_pattern,
            "amqp topic exchange declared"
        );

        Ok(Self {
            connection,
            channel,
            exchange: options.exchange.clone(),
        })
    }
}

#[async_trait]
impl ExchangeChannel for AmqpChannel {
    async fn publish(&self, routing_key: &str, payload: &[u8]) -> Result<()> {
        let properties = BasicProperties::default()
            .with_content_type(CONTENT_TYPE_JSON.into())
            .with_delivery_mode(DELIVERY_MODE_PERSISTENT);

        let confirmation = self
            .channel
            .basic_publish(
                &self.exchange,
                routing_key,
                BasicPublishOptions::default(),
                payload,
                properties,
            )
            .await?
            .await?;

        if confirmation.is_nack() {
            return Err(DomainError::event_bus(format!(
                "amqp: broker rejected message for routing key {routing_key}"
            )));
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.channel.close(REPLY_SUCCESS, "OK").await?;
        self.connection.close(REPLY_SUCCESS, "OK").await?;
        Ok(())
    }
}
