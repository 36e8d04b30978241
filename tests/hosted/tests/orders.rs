use anyhow::Result;
use borsh::BorshDeserialize;
use solana_sdk::instruction::Instruction;
use solana_sdk::signature::Signer;
use spl_associated_token_account::get_associated_token_address;

use hosted_sim::exchange_test_context;
use hosted_sim::runtime::ExchangeTestContext;
use hosted_sim::setup_helper::configure_exchange;
use obsim_instructions::ix::{anchor_discriminator, PlaceOrderArgs, PlaceOrderType, Side};
use obsim_simulation::TestLedger;

fn placed_orders(ctx: &ExchangeTestContext) -> Vec<Instruction> {
    let ledger: &TestLedger = ctx.rpc.as_any().downcast_ref().unwrap();
    let discriminator = anchor_discriminator("place_order");

    ledger
        .instruction_log()
        .into_iter()
        .filter(|ix| ix.program_id == ctx.program && ix.data.get(..8) == Some(&discriminator[..]))
        .collect()
}

#[tokio::test]
async fn ladder_straddles_the_mid_price() -> Result<()> {
    let ctx = exchange_test_context!()?;
    configure_exchange(&ctx, 1, 1, 3).await?;

    let orders = placed_orders(&ctx);
    assert_eq!(orders.len(), 6);

    let args: Vec<PlaceOrderArgs> = orders
        .iter()
        .map(|ix| PlaceOrderArgs::try_from_slice(&ix.data[8..]).unwrap())
        .collect();

    let bids: Vec<&PlaceOrderArgs> = args.iter().filter(|o| o.side == Side::Bid).collect();
    let asks: Vec<&PlaceOrderArgs> = args.iter().filter(|o| o.side == Side::Ask).collect();

    assert_eq!(
        bids.iter().map(|o| o.price_lots).collect::<Vec<_>>(),
        vec![999, 998, 997]
    );
    assert_eq!(
        asks.iter().map(|o| o.price_lots).collect::<Vec<_>>(),
        vec![1001, 1002, 1003]
    );

    assert_eq!(
        bids.iter().map(|o| o.client_order_id).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert_eq!(
        asks.iter().map(|o| o.client_order_id).collect::<Vec<_>>(),
        vec![4, 5, 6]
    );

    for order in &args {
        assert_eq!(order.order_type, PlaceOrderType::Limit);
        assert_eq!(order.max_quote_lots_including_fees, 1_000_000);
    }
    assert!(bids.iter().all(|o| o.max_base_lots == 10));
    assert!(asks.iter().all(|o| o.max_base_lots == 10_000));

    Ok(())
}

#[tokio::test]
async fn orders_are_funded_from_the_matching_side() -> Result<()> {
    let ctx = exchange_test_context!()?;
    let environment = configure_exchange(&ctx, 1, 1, 2).await?;
    let market = &environment.markets[0];
    let owner = environment.users[0].wallet.pubkey();

    for ix in placed_orders(&ctx) {
        let order = PlaceOrderArgs::try_from_slice(&ix.data[8..])?;
        let user_token_account = ix.accounts[3].pubkey;
        let market_vault = ix.accounts[8].pubkey;

        match order.side {
            Side::Bid => {
                assert_eq!(
                    user_token_account,
                    get_associated_token_address(&owner, &market.quote_mint)
                );
                assert_eq!(market_vault, market.quote_vault);
            }
            Side::Ask => {
                assert_eq!(
                    user_token_account,
                    get_associated_token_address(&owner, &market.base_mint)
                );
                assert_eq!(market_vault, market.base_vault);
            }
        }
    }

    Ok(())
}
